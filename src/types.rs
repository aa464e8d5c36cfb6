/// Core value and record types for the alignment engine
use serde::{Deserialize, Serialize};

/// One entry of a per-symbol series: the value observed (or carried
/// forward) for the bucket starting at `bucket`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarPoint {
    pub value: f64,
    pub bucket: u64,
}

impl BarPoint {
    pub fn new(value: f64, bucket: u64) -> Self {
        BarPoint { value, bucket }
    }
}

/// Aligner queue entry: a bar point plus arrival time and fill origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub value: f64,
    pub bucket: u64,
    /// Caller-supplied wall clock (ms) of the update that wrote this record
    pub wall_time_ms: u64,
    /// Set when the record was carried forward rather than observed
    pub synthesized: bool,
}

impl AlignedRecord {
    pub fn observed(value: f64, bucket: u64, wall_time_ms: u64) -> Self {
        AlignedRecord {
            value,
            bucket,
            wall_time_ms,
            synthesized: false,
        }
    }

    pub fn carried(value: f64, bucket: u64, wall_time_ms: u64) -> Self {
        AlignedRecord {
            value,
            bucket,
            wall_time_ms,
            synthesized: true,
        }
    }
}

/// Instance-scoped watermarks.
///
/// Every engine owns its own copy; nothing here is process-global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermarks {
    /// Oldest bucket every series should retain
    pub start_time: u64,
    /// Most advanced bucket seen across all symbols
    pub last_open_date: u64,
    /// Most advanced raw arrival time (ms) across all symbols
    pub last_wall_time: u64,
}

impl Watermarks {
    pub fn observe_bucket(&mut self, bucket: u64) {
        self.last_open_date = self.last_open_date.max(bucket);
    }

    pub fn observe_wall_time(&mut self, wall_time_ms: u64) {
        self.last_wall_time = self.last_wall_time.max(wall_time_ms);
    }

    pub fn advance_start(&mut self, start_time: u64) {
        self.start_time = self.start_time.max(start_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watermarks_only_advance() {
        let mut marks = Watermarks::default();
        marks.observe_bucket(120);
        marks.observe_bucket(60);
        marks.observe_wall_time(5_000);
        marks.observe_wall_time(4_000);
        marks.advance_start(300);
        marks.advance_start(240);

        assert_eq!(marks.last_open_date, 120);
        assert_eq!(marks.last_wall_time, 5_000);
        assert_eq!(marks.start_time, 300);
    }

    #[test]
    fn test_record_constructors() {
        let real = AlignedRecord::observed(1.5, 60, 61_000);
        let fill = AlignedRecord::carried(1.5, 120, 181_000);
        assert!(!real.synthesized);
        assert!(fill.synthesized);
        assert_eq!(fill.bucket, 120);
    }
}
