//! CSV session logs
//!
//! ## Formats
//!
//! Raw sample log, one row per sensor reading:
//!
//! ```csv
//! timestamp,acc_x,acc_y,acc_z
//! 1714650000123,0.12,-0.04,9.81
//! ```
//!
//! Metrics log, one row per reduced record:
//!
//! ```csv
//! timestamp,mean_x,mean_y,mean_z,min_x,min_y,min_z,max_x,max_y,max_z,std_x,std_y,std_z
//! ```
//!
//! Bands are never persisted; they are recomputed from the floats on
//! read. Malformed rows are skipped and counted, never fatal — a
//! partially corrupted log still yields every parseable row.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::record::ReducedRecord;
use crate::sample::RawSample;
use crate::stats::AxisSummary;
use crate::stream::{SampleStream, StreamError};
use crate::time::Timestamp;

/// Header row of a raw sample log.
pub const RAW_LOG_HEADER: &str = "timestamp,acc_x,acc_y,acc_z";

/// Header row of a metrics log.
pub const METRICS_HEADER: &str =
    "timestamp,mean_x,mean_y,mean_z,min_x,min_y,min_z,max_x,max_y,max_z,std_x,std_y,std_z";

/// Counters kept while reading a log.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogStats {
    /// Data rows inspected (header excluded)
    pub lines_read: usize,
    /// Rows that failed to parse and were skipped
    pub parse_errors: usize,
}

/// Raw-sample stream over a recorded CSV log.
///
/// Reads lazily through a buffered reader; the header row is skipped
/// on open. Implements [`SampleStream`], so the replay engine drives
/// it exactly like an in-memory fixture.
pub struct RawLogStream {
    reader: BufReader<File>,
    line: String,
    stats: LogStats,
}

impl RawLogStream {
    /// Open a raw log for streaming.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StreamError<io::Error>> {
        let file = File::open(path).map_err(StreamError::Transport)?;
        let mut stream = Self {
            reader: BufReader::new(file),
            line: String::new(),
            stats: LogStats::default(),
        };

        // Header row is not data; a completely empty file is fine too
        stream.read_line().map_err(StreamError::Transport)?;
        Ok(stream)
    }

    /// Read counters so far.
    pub fn stats(&self) -> &LogStats {
        &self.stats
    }

    /// Next line without trailing newline, or `None` at EOF.
    fn read_line(&mut self) -> io::Result<Option<&str>> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim_end()))
    }
}

impl SampleStream for RawLogStream {
    type Error = io::Error;

    fn poll_next(&mut self) -> nb::Result<RawSample, StreamError<io::Error>> {
        loop {
            // Parse inside the borrow of the line buffer, count after
            let parsed = {
                let line = self
                    .read_line()
                    .map_err(|e| nb::Error::Other(StreamError::Transport(e)))?;

                let Some(line) = line else {
                    return Err(nb::Error::Other(StreamError::EndOfStream));
                };
                if line.is_empty() {
                    continue;
                }

                let parsed = parse_raw_row(line);
                if parsed.is_none() {
                    log::debug!("skipping malformed raw log row: {line:?}");
                }
                parsed
            };

            self.stats.lines_read += 1;
            match parsed {
                Some(sample) => return Ok(sample),
                None => self.stats.parse_errors += 1,
            }
        }
    }
}

fn parse_raw_row(line: &str) -> Option<RawSample> {
    let mut fields = line.split(',');
    let timestamp = fields.next()?.trim().parse::<Timestamp>().ok()?;
    let x = fields.next()?.trim().parse::<f32>().ok()?;
    let y = fields.next()?.trim().parse::<f32>().ok()?;
    let z = fields.next()?.trim().parse::<f32>().ok()?;
    Some(RawSample::new(timestamp, x, y, z))
}

/// Append-only writer for a raw sample log.
pub struct RawLogWriter {
    out: BufWriter<File>,
}

impl RawLogWriter {
    /// Create the file and write the header row.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{RAW_LOG_HEADER}")?;
        Ok(Self { out })
    }

    /// Append one sample row.
    pub fn append(&mut self, sample: &RawSample) -> io::Result<()> {
        writeln!(
            self.out,
            "{},{},{},{}",
            sample.timestamp, sample.x, sample.y, sample.z
        )
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Append-only writer for a metrics log.
pub struct MetricsWriter {
    out: BufWriter<File>,
}

impl MetricsWriter {
    /// Create the file and write the header row.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{METRICS_HEADER}")?;
        Ok(Self { out })
    }

    /// Append one record row. Bands are not persisted.
    pub fn append(&mut self, record: &ReducedRecord) -> io::Result<()> {
        let (x, y, z) = (&record.x.values, &record.y.values, &record.z.values);
        writeln!(
            self.out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            record.timestamp,
            x.mean, y.mean, z.mean,
            x.min, y.min, z.min,
            x.max, y.max, z.max,
            x.std, y.std, z.std,
        )
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Load a metrics log, reclassifying every band from the floats.
///
/// Malformed rows are skipped and counted in the returned stats.
pub fn read_metrics(path: impl AsRef<Path>) -> io::Result<(Vec<ReducedRecord>, LogStats)> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    let mut stats = LogStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if index == 0 || line.trim().is_empty() {
            continue;
        }

        stats.lines_read += 1;
        match parse_metrics_row(&line) {
            Some(record) => records.push(record),
            None => {
                stats.parse_errors += 1;
                log::debug!("skipping malformed metrics row: {line:?}");
            }
        }
    }

    Ok((records, stats))
}

fn parse_metrics_row(line: &str) -> Option<ReducedRecord> {
    let mut fields = line.split(',');
    let timestamp = fields.next()?.trim().parse::<Timestamp>().ok()?;

    let mut floats = [0.0f32; 12];
    for slot in floats.iter_mut() {
        *slot = fields.next()?.trim().parse::<f32>().ok()?;
    }

    // Column layout groups by statistic, not by axis
    let summary = |axis: usize| AxisSummary {
        mean: floats[axis],
        min: floats[3 + axis],
        max: floats[6 + axis],
        std: floats[9 + axis],
    };

    Some(ReducedRecord::from_summaries(
        timestamp,
        summary(0),
        summary(1),
        summary(2),
    ))
}

/// File names for one session's logs: `YYYYMMDD_HHMMSS_sensor.csv`
/// and `YYYYMMDD_HHMMSS_metrics.csv`.
pub fn session_file_names(now: Timestamp) -> (String, String) {
    let stamp = chrono::DateTime::from_timestamp_millis(now as i64)
        .map(|dt| dt.format("%Y%m%d_%H%M%S").to_string())
        .unwrap_or_else(|| now.to_string());

    (format!("{stamp}_sensor.csv"), format!("{stamp}_metrics.csv"))
}
