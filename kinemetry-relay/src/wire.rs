//! Wire payloads
//!
//! Two payload kinds cross the link, each a small JSON document:
//!
//! - **Snapshot**: an outer publish timestamp plus up to one
//!   transmission window of records. The publish timestamp exists
//!   only to force change-notification on transports that dedup
//!   identical payloads; ordering always comes from the records.
//! - **Session state**: the collecting flag plus its publish time,
//!   delivered on its own channel, last-value-wins.
//!
//! Records travel flat — one timestamp, twelve float fields, twelve
//! band-code fields — and the field names are part of the contract.
//! Band codes are validated on decode; the floats are taken as-is.

use serde::{Deserialize, Serialize};

use kinemetry_core::record::{AxisBands, AxisStat};
use kinemetry_core::{AxisSummary, Band, ReducedRecord, SessionSignal, Timestamp};

use crate::RelayError;

/// One record in wire form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRecord {
    /// Emission timestamp in milliseconds
    pub timestamp: Timestamp,

    /// Mean per axis
    pub mean_x: f32,
    /// Mean per axis
    pub mean_y: f32,
    /// Mean per axis
    pub mean_z: f32,
    /// Minimum per axis
    pub min_x: f32,
    /// Minimum per axis
    pub min_y: f32,
    /// Minimum per axis
    pub min_z: f32,
    /// Maximum per axis
    pub max_x: f32,
    /// Maximum per axis
    pub max_y: f32,
    /// Maximum per axis
    pub max_z: f32,
    /// Standard deviation per axis
    pub std_x: f32,
    /// Standard deviation per axis
    pub std_y: f32,
    /// Standard deviation per axis
    pub std_z: f32,

    /// Band code of the mean per axis
    pub cat_mean_x: u8,
    /// Band code of the mean per axis
    pub cat_mean_y: u8,
    /// Band code of the mean per axis
    pub cat_mean_z: u8,
    /// Band code of the minimum per axis
    pub cat_min_x: u8,
    /// Band code of the minimum per axis
    pub cat_min_y: u8,
    /// Band code of the minimum per axis
    pub cat_min_z: u8,
    /// Band code of the maximum per axis
    pub cat_max_x: u8,
    /// Band code of the maximum per axis
    pub cat_max_y: u8,
    /// Band code of the maximum per axis
    pub cat_max_z: u8,
    /// Band code of the deviation per axis
    pub cat_std_x: u8,
    /// Band code of the deviation per axis
    pub cat_std_y: u8,
    /// Band code of the deviation per axis
    pub cat_std_z: u8,
}

impl From<&ReducedRecord> for WireRecord {
    fn from(record: &ReducedRecord) -> Self {
        let (x, y, z) = (&record.x, &record.y, &record.z);
        Self {
            timestamp: record.timestamp,
            mean_x: x.values.mean,
            mean_y: y.values.mean,
            mean_z: z.values.mean,
            min_x: x.values.min,
            min_y: y.values.min,
            min_z: z.values.min,
            max_x: x.values.max,
            max_y: y.values.max,
            max_z: z.values.max,
            std_x: x.values.std,
            std_y: y.values.std,
            std_z: z.values.std,
            cat_mean_x: x.bands.mean.code(),
            cat_mean_y: y.bands.mean.code(),
            cat_mean_z: z.bands.mean.code(),
            cat_min_x: x.bands.min.code(),
            cat_min_y: y.bands.min.code(),
            cat_min_z: z.bands.min.code(),
            cat_max_x: x.bands.max.code(),
            cat_max_y: y.bands.max.code(),
            cat_max_z: z.bands.max.code(),
            cat_std_x: x.bands.std.code(),
            cat_std_y: y.bands.std.code(),
            cat_std_z: z.bands.std.code(),
        }
    }
}

impl WireRecord {
    /// Decode into a core record, validating the band codes.
    pub fn into_record(self) -> Result<ReducedRecord, RelayError> {
        let x = axis_stat(
            self.mean_x,
            self.min_x,
            self.max_x,
            self.std_x,
            [self.cat_mean_x, self.cat_min_x, self.cat_max_x, self.cat_std_x],
        )?;
        let y = axis_stat(
            self.mean_y,
            self.min_y,
            self.max_y,
            self.std_y,
            [self.cat_mean_y, self.cat_min_y, self.cat_max_y, self.cat_std_y],
        )?;
        let z = axis_stat(
            self.mean_z,
            self.min_z,
            self.max_z,
            self.std_z,
            [self.cat_mean_z, self.cat_min_z, self.cat_max_z, self.cat_std_z],
        )?;

        Ok(ReducedRecord {
            timestamp: self.timestamp,
            x,
            y,
            z,
        })
    }
}

fn axis_stat(
    mean: f32,
    min: f32,
    max: f32,
    std: f32,
    codes: [u8; 4],
) -> Result<AxisStat, RelayError> {
    let band = |code: u8| {
        Band::from_code(code).ok_or(RelayError::Payload("band code out of range"))
    };

    Ok(AxisStat {
        values: AxisSummary { mean, min, max, std },
        bands: AxisBands {
            mean: band(codes[0])?,
            min: band(codes[1])?,
            max: band(codes[2])?,
            std: band(codes[3])?,
        },
    })
}

/// Snapshot payload: publish timestamp plus buffered records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPayload {
    /// Publish time; forces change-notification only, never ordering
    pub published_at: Timestamp,
    /// Buffered records, oldest first as published
    pub records: Vec<WireRecord>,
}

/// Session-state payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Whether the producer is collecting
    pub is_collecting: bool,
    /// Publish time of the signal
    pub timestamp: Timestamp,
}

/// Encode a snapshot for publication.
pub fn encode_snapshot(
    records: &[ReducedRecord],
    published_at: Timestamp,
) -> Result<Vec<u8>, RelayError> {
    let payload = SnapshotPayload {
        published_at,
        records: records.iter().map(WireRecord::from).collect(),
    };
    Ok(serde_json::to_vec(&payload)?)
}

/// Decode a snapshot payload into `(published_at, records)`.
pub fn decode_snapshot(bytes: &[u8]) -> Result<(Timestamp, Vec<ReducedRecord>), RelayError> {
    let payload: SnapshotPayload = serde_json::from_slice(bytes)?;
    let records = payload
        .records
        .into_iter()
        .map(WireRecord::into_record)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((payload.published_at, records))
}

/// Encode a session-state signal.
pub fn encode_state(signal: SessionSignal) -> Result<Vec<u8>, RelayError> {
    let payload = SessionPayload {
        is_collecting: signal.active,
        timestamp: signal.timestamp,
    };
    Ok(serde_json::to_vec(&payload)?)
}

/// Decode a session-state payload.
pub fn decode_state(bytes: &[u8]) -> Result<SessionSignal, RelayError> {
    let payload: SessionPayload = serde_json::from_slice(bytes)?;
    Ok(SessionSignal::new(payload.is_collecting, payload.timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_survives_the_wire() {
        let records = [
            ReducedRecord::from_axes(1000, &[0.0, 10.0], &[1.0], &[-6.0]).unwrap(),
            ReducedRecord::from_axes(2000, &[2.0], &[2.0], &[2.0]).unwrap(),
        ];

        let bytes = encode_snapshot(&records, 2050).unwrap();
        let (published_at, decoded) = decode_snapshot(&bytes).unwrap();

        assert_eq!(published_at, 2050);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0], records[0]);
        assert_eq!(decoded[1], records[1]);
        // Bands crossed the wire as codes, not as recomputation
        assert_eq!(decoded[0].z.bands.mean, Band::Low);
    }

    #[test]
    fn field_names_are_the_contract() {
        let record = ReducedRecord::from_axes(1000, &[5.0], &[0.0], &[0.0]).unwrap();
        let bytes = encode_snapshot(&[record], 1100).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        for field in ["published_at", "mean_x", "std_z", "cat_mean_x", "cat_std_z"] {
            assert!(text.contains(field), "missing wire field {field}");
        }
    }

    #[test]
    fn invalid_band_code_is_rejected() {
        let record = ReducedRecord::from_axes(1000, &[1.0], &[1.0], &[1.0]).unwrap();
        let mut wire = WireRecord::from(&record);
        wire.cat_std_z = 9;

        assert!(matches!(
            wire.into_record(),
            Err(RelayError::Payload(_))
        ));
    }

    #[test]
    fn state_round_trip() {
        let bytes = encode_state(SessionSignal::new(true, 7000)).unwrap();
        let signal = decode_state(&bytes).unwrap();
        assert!(signal.active);
        assert_eq!(signal.timestamp, 7000);
    }
}
