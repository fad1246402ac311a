//! Reprocess a recorded raw log into a metrics log
//!
//! Writes a synthetic 10-second raw log into the system temp
//! directory, runs the replay engine over it, and prints the
//! regenerated records.
//!
//! Run with: cargo run --example reprocess_log

use kinemetry_core::logfile::{read_metrics, session_file_names, RawLogWriter};
use kinemetry_core::replay::reprocess_file;
use kinemetry_core::{Axis, RawSample, StatKind, SystemClock};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir();
    let (sensor_name, metrics_name) = session_file_names(1_714_650_000_000);
    let raw_path = dir.join(sensor_name);
    let metrics_path = dir.join(metrics_name);

    // Ten seconds of simulated wrist motion at 100 Hz, with a burst
    // of vigorous movement in the middle
    let mut writer = RawLogWriter::create(&raw_path)?;
    for i in 0..1000u64 {
        let t = i as f32 / 100.0;
        let burst = if (400..600).contains(&i) { 6.0 } else { 1.0 };
        let sample = RawSample::new(
            i * 10,
            (t * 2.1).sin() * burst,
            (t * 1.3).cos() * burst,
            9.81 + (t * 5.0).sin() * 0.2,
        );
        writer.append(&sample)?;
    }
    writer.flush()?;

    let report = reprocess_file(&raw_path, &metrics_path, SystemClock)
        .map_err(|e| format!("replay failed: {e:?}"))?;
    println!(
        "reprocessed {} samples into {} records ({} rows skipped)",
        report.samples, report.records, report.lines_skipped
    );

    let (records, _) = read_metrics(&metrics_path)?;
    for (second, record) in records.iter().enumerate() {
        let x = record.axis(Axis::X);
        println!(
            "t+{:>2}s  x mean {:>6.2} ({})  min {:>6.2}  max {:>6.2}  std {:>5.2} ({})",
            second,
            x.value(StatKind::Mean),
            x.band(StatKind::Mean).name(),
            x.value(StatKind::Min),
            x.value(StatKind::Max),
            x.value(StatKind::Std),
            x.band(StatKind::Std).name(),
        );
    }

    println!("metrics written to {}", metrics_path.display());
    Ok(())
}
