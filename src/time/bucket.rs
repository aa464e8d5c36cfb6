/// Bucket boundary arithmetic shared by the series and the aligner
use chrono::{DateTime, TimeZone, Utc};

/// Milliseconds per second, the aligner's input-to-bucket unit ratio
pub const MILLIS_PER_SECOND: u64 = 1_000;

/// Start of the bucket `[b, b + timeframe)` containing `timestamp`.
///
/// `timeframe` must be non-zero; constructors validate this before any
/// engine calls it.
#[inline]
pub fn bucket(timestamp: u64, timeframe: u64) -> u64 {
    timestamp - (timestamp % timeframe)
}

/// Normalize a millisecond wall-clock reading to whole seconds
#[inline]
pub fn millis_to_secs(wall_time_ms: u64) -> u64 {
    wall_time_ms / MILLIS_PER_SECOND
}

/// Number of buckets from `from` up to and including `to`.
///
/// Both arguments must already be bucket-aligned.
#[inline]
pub fn buckets_between(from: u64, to: u64, timeframe: u64) -> usize {
    if to < from {
        return 0;
    }
    ((to - from) / timeframe) as usize + 1
}

/// Render a seconds-based bucket as a UTC datetime for log output
pub fn bucket_datetime(bucket_secs: u64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(i64::try_from(bucket_secs).ok()?, 0).single()
}
