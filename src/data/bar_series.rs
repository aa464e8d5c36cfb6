/// Per-symbol bucketed series with sliding-window or periodic retention
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::data::bucket_queue::{BucketQueue, Placement};
use crate::error::{EngineError, Result};
use crate::time::{bucket, buckets_between};
use crate::types::{BarPoint, Watermarks};

/// Retention strategy, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesMode {
    /// Keep the `window_size` most recent buckets
    Sliding,
    /// Accumulate from each `window_size * timeframe` boundary, then restart
    Periodic,
}

impl SeriesMode {
    pub fn from_flag(periodic: bool) -> Self {
        if periodic {
            SeriesMode::Periodic
        } else {
            SeriesMode::Sliding
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SeriesMode::Sliding => "sliding",
            SeriesMode::Periodic => "periodic",
        }
    }
}

/// Start-time and target-length bookkeeping for one [`SeriesMode`]
#[derive(Debug, Clone)]
pub(crate) struct Retention {
    mode: SeriesMode,
    window_size: usize,
    timeframe: u64,
    span: u64,
    target_len: usize,
}

impl Retention {
    pub(crate) fn new(mode: SeriesMode, window_size: usize, timeframe: u64) -> Result<Self> {
        if window_size == 0 {
            return Err(EngineError::InvalidParameter("window_size must be > 0".to_string()));
        }
        if timeframe == 0 {
            return Err(EngineError::InvalidParameter("timeframe must be > 0".to_string()));
        }
        let span = (window_size as u64).checked_mul(timeframe).ok_or_else(|| {
            EngineError::InvalidParameter(format!(
                "window_size {} * timeframe {} overflows",
                window_size, timeframe
            ))
        })?;

        Ok(Retention {
            mode,
            window_size,
            timeframe,
            span,
            target_len: Self::initial_target(mode, window_size),
        })
    }

    fn initial_target(mode: SeriesMode, window_size: usize) -> usize {
        match mode {
            SeriesMode::Sliding => window_size,
            // No period observed yet
            SeriesMode::Periodic => 0,
        }
    }

    /// Advance `start_time` and the target length for a new active bucket
    pub(crate) fn advance(&mut self, marks: &mut Watermarks, active: u64, timestamp: u64) {
        match self.mode {
            SeriesMode::Sliding => {
                if active >= self.span {
                    marks.advance_start(active - (self.span - self.timeframe));
                }
            }
            SeriesMode::Periodic => {
                let period_start = bucket(timestamp, self.span);
                if period_start > marks.start_time || self.target_len == 0 {
                    marks.advance_start(period_start);
                    self.target_len = 1;
                }
                if active >= marks.start_time {
                    let elapsed = buckets_between(marks.start_time, active, self.timeframe);
                    self.target_len = self.target_len.max(elapsed);
                }
            }
        }
    }

    pub(crate) fn target_len(&self) -> usize {
        self.target_len
    }

    pub(crate) fn mode(&self) -> SeriesMode {
        self.mode
    }

    pub(crate) fn window_size(&self) -> usize {
        self.window_size
    }

    pub(crate) fn timeframe(&self) -> u64 {
        self.timeframe
    }

    pub(crate) fn reset(&mut self) {
        self.target_len = Self::initial_target(self.mode, self.window_size);
    }
}

pub(crate) fn validate_symbol_count(symbol_count: usize) -> Result<()> {
    if symbol_count == 0 {
        return Err(EngineError::InvalidParameter("symbol_count must be > 0".to_string()));
    }
    Ok(())
}

/// Bucketed history for a fixed set of symbols sharing one timeframe
pub struct BucketedSeries {
    series: Vec<BucketQueue<BarPoint>>,
    retention: Retention,
    marks: Watermarks,
}

impl BucketedSeries {
    pub fn new(
        window_size: usize,
        timeframe: u64,
        mode: SeriesMode,
        symbol_count: usize,
    ) -> Result<Self> {
        validate_symbol_count(symbol_count)?;
        let retention = Retention::new(mode, window_size, timeframe)?;

        let series = (0..symbol_count)
            .map(|_| BucketQueue::new(timeframe, window_size + 1))
            .collect();

        info!(
            "Created {} series: {} symbols, window {} x {}",
            mode.as_str(),
            symbol_count,
            window_size,
            timeframe
        );

        Ok(BucketedSeries {
            series,
            retention,
            marks: Watermarks::default(),
        })
    }

    /// Build from a validated config; timestamps are then in seconds
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.window_size,
            config.timeframe_secs,
            config.mode(),
            config.symbols.len(),
        )
    }

    /// Record `value` for symbol `index` at `timestamp`
    pub fn try_update(&mut self, index: usize, value: f64, timestamp: u64) -> Result<Placement> {
        let count = self.series.len();
        let timeframe = self.retention.timeframe();
        let queue = self
            .series
            .get_mut(index)
            .ok_or(EngineError::SymbolOutOfRange { index, count })?;

        let active = bucket(timestamp, timeframe);
        if let Some(last_bucket) = queue.last_bucket() {
            if active < last_bucket {
                return Err(EngineError::NonMonotonic {
                    symbol: index,
                    last_bucket,
                    bucket: active,
                });
            }
        }

        self.marks.observe_bucket(active);
        self.retention.advance(&mut self.marks, active, timestamp);

        let placement = queue.place(
            BarPoint::new(value, active),
            self.marks.start_time,
            |prev, next| BarPoint::new(prev.value, next),
        );
        if let Placement::Appended { filled } = placement {
            if filled > 0 {
                debug!(symbol = index, bucket = active, filled, "Carried forward gap buckets");
            }
        }

        let evicted = queue.evict_before(self.marks.start_time);
        if evicted > 0 {
            debug!(symbol = index, evicted, start_time = self.marks.start_time, "Evicted stale buckets");
        }

        Ok(placement)
    }

    /// Boolean form of [`BucketedSeries::try_update`]; refusals are logged
    pub fn update(&mut self, index: usize, value: f64, timestamp: u64) -> bool {
        match self.try_update(index, value, timestamp) {
            Ok(_) => true,
            Err(e) => {
                warn!("Series update refused: {} ({})", e, e.error_code());
                false
            }
        }
    }

    /// Every series is non-empty, starts at `start_time` and has the target length
    pub fn is_ready(&self) -> bool {
        let target = self.retention.target_len();
        self.series.iter().all(|queue| match queue.front() {
            Some(front) => front.bucket == self.marks.start_time && queue.len() == target,
            None => false,
        })
    }

    /// Retained values for symbol `index`, oldest first
    pub fn to_vector(&self, index: usize) -> Vec<f64> {
        self.series
            .get(index)
            .map(|queue| queue.iter().map(|p| p.value).collect())
            .unwrap_or_default()
    }

    /// Retained bar points for symbol `index`, oldest first
    pub fn points(&self, index: usize) -> Vec<BarPoint> {
        self.series
            .get(index)
            .map(|queue| queue.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Oldest retained value: the symbol's value at the window edge
    pub fn front(&self, index: usize) -> Option<f64> {
        self.series.get(index)?.front().map(|p| p.value)
    }

    /// Newest retained value
    pub fn back(&self, index: usize) -> Option<f64> {
        self.series.get(index)?.back().map(|p| p.value)
    }

    pub fn len(&self, index: usize) -> usize {
        self.series.get(index).map_or(0, BucketQueue::len)
    }

    pub fn symbol_count(&self) -> usize {
        self.series.len()
    }

    pub fn mode(&self) -> SeriesMode {
        self.retention.mode()
    }

    pub fn window_size(&self) -> usize {
        self.retention.window_size()
    }

    pub fn target_len(&self) -> usize {
        self.retention.target_len()
    }

    pub fn watermarks(&self) -> Watermarks {
        self.marks
    }

    /// Clear all history and watermarks
    pub fn reset(&mut self) {
        for queue in &mut self.series {
            queue.clear();
        }
        self.retention.reset();
        self.marks = Watermarks::default();
        info!("Series reset ({} symbols)", self.series.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u64 = 60;

    fn buckets(series: &BucketedSeries, index: usize) -> Vec<u64> {
        series.points(index).iter().map(|p| p.bucket).collect()
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(BucketedSeries::new(0, T, SeriesMode::Sliding, 1).is_err());
        assert!(BucketedSeries::new(5, 0, SeriesMode::Sliding, 1).is_err());
        assert!(BucketedSeries::new(5, T, SeriesMode::Sliding, 0).is_err());
        assert!(BucketedSeries::new(usize::MAX, u64::MAX, SeriesMode::Periodic, 1).is_err());
    }

    #[test]
    fn test_out_of_range_index_is_refused() {
        let mut series = BucketedSeries::new(5, T, SeriesMode::Sliding, 2).unwrap();
        assert!(!series.update(2, 1.0, 60));
        assert!(matches!(
            series.try_update(7, 1.0, 60),
            Err(EngineError::SymbolOutOfRange { index: 7, count: 2 })
        ));
        assert_eq!(series.watermarks(), Watermarks::default());
        assert!(series.to_vector(2).is_empty());
    }

    #[test]
    fn test_contiguous_buckets_for_increasing_timestamps() {
        let mut series = BucketedSeries::new(100, T, SeriesMode::Sliding, 1).unwrap();
        let mut ts = 3_000;
        for i in 0..40 {
            assert!(series.update(0, i as f64, ts));
            ts += 17 + (i % 5) * 23;
        }

        let got = buckets(&series, 0);
        let first = got[0];
        let expected: Vec<u64> = (0..got.len() as u64).map(|k| first + k * T).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_same_bucket_updates_overwrite_in_place() {
        let mut series = BucketedSeries::new(5, T, SeriesMode::Sliding, 1).unwrap();
        series.update(0, 1.0, 600);
        series.update(0, 2.0, 660);
        series.update(0, 3.0, 670);
        series.update(0, 4.0, 719);

        assert_eq!(series.len(0), 2);
        assert_eq!(series.to_vector(0), vec![1.0, 4.0]);
        assert_eq!(buckets(&series, 0), vec![600, 660]);
    }

    #[test]
    fn test_gap_fill_carries_last_value() {
        let mut series = BucketedSeries::new(10, T, SeriesMode::Sliding, 1).unwrap();
        let b = 6_000;
        series.update(0, 10.0, b);
        series.update(0, 40.0, b + 3 * T);

        assert_eq!(buckets(&series, 0), vec![b, b + T, b + 2 * T, b + 3 * T]);
        assert_eq!(series.to_vector(0), vec![10.0, 10.0, 10.0, 40.0]);
    }

    #[test]
    fn test_sliding_readiness_is_monotonic() {
        let mut series = BucketedSeries::new(5, T, SeriesMode::Sliding, 1).unwrap();
        let mut became_ready = false;
        for i in 0..30u64 {
            let ts = 1_200 + i * 45;
            series.update(0, i as f64, ts);
            if became_ready {
                assert!(series.is_ready(), "lost readiness at ts {}", ts);
            }
            became_ready |= series.is_ready();
        }
        assert!(became_ready);
        assert_eq!(series.len(0), 5);
    }

    #[test]
    fn test_sliding_window_front_is_window_edge() {
        let mut series = BucketedSeries::new(3, T, SeriesMode::Sliding, 1).unwrap();
        for (i, ts) in [600u64, 660, 720, 780].iter().enumerate() {
            series.update(0, i as f64, *ts);
        }

        assert!(series.is_ready());
        assert_eq!(series.to_vector(0), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.front(0), Some(1.0));
        assert_eq!(series.back(0), Some(3.0));
        assert_eq!(series.watermarks().start_time, 660);
    }

    #[test]
    fn test_readiness_requires_all_symbols() {
        let mut series = BucketedSeries::new(2, T, SeriesMode::Sliding, 2).unwrap();
        series.update(0, 1.0, 600);
        series.update(0, 2.0, 660);
        assert!(!series.is_ready());

        series.update(1, 5.0, 600);
        series.update(1, 6.0, 660);
        assert!(series.is_ready());

        // Symbol 0 moves on alone; symbol 1 now trails start_time
        series.update(0, 3.0, 720);
        assert!(!series.is_ready());
        series.update(1, 7.0, 720);
        assert!(series.is_ready());
    }

    #[test]
    fn test_outlier_jump_fills_only_the_window() {
        let mut series = BucketedSeries::new(5, 1, SeriesMode::Sliding, 1).unwrap();
        series.update(0, 1.0, 0);

        let placement = series.try_update(0, 2.0, 100_000_000).unwrap();
        assert_eq!(placement, Placement::Appended { filled: 4 });
        assert_eq!(series.len(0), 5);
        assert_eq!(
            buckets(&series, 0),
            vec![99_999_996, 99_999_997, 99_999_998, 99_999_999, 100_000_000]
        );
        assert_eq!(series.to_vector(0), vec![1.0, 1.0, 1.0, 1.0, 2.0]);
        assert!(series.is_ready());
    }

    #[test]
    fn test_periodic_outlier_jump_starts_at_period() {
        let mut series = BucketedSeries::new(5, T, SeriesMode::Periodic, 1).unwrap();
        series.update(0, 1.0, 0);

        let placement = series.try_update(0, 2.0, 60_000_000_120).unwrap();
        assert_eq!(placement, Placement::Appended { filled: 2 });
        assert_eq!(series.to_vector(0), vec![1.0, 1.0, 2.0]);
        assert!(series.is_ready());
    }

    #[test]
    fn test_stale_last_entry_is_never_evicted() {
        let mut series = BucketedSeries::new(2, T, SeriesMode::Sliding, 2).unwrap();
        series.update(1, 9.0, 600);
        series.update(0, 1.0, 6_000);

        assert_eq!(series.front(1), Some(9.0));
        assert_eq!(series.len(1), 1);
        assert!(!series.is_ready());
    }

    #[test]
    fn test_non_monotonic_update_is_refused() {
        let mut series = BucketedSeries::new(5, T, SeriesMode::Sliding, 1).unwrap();
        series.update(0, 1.0, 900);
        let marks = series.watermarks();

        assert!(!series.update(0, 2.0, 800));
        assert_eq!(series.to_vector(0), vec![1.0]);
        assert_eq!(series.watermarks(), marks);
    }

    #[test]
    fn test_periodic_boundary_resets_to_one_bucket() {
        let mut series = BucketedSeries::new(5, T, SeriesMode::Periodic, 1).unwrap();
        for (i, ts) in [0u64, 60, 120, 180, 240].iter().enumerate() {
            series.update(0, 100.0 + i as f64, *ts);
        }
        assert!(series.is_ready());
        assert_eq!(series.len(0), 5);

        series.update(0, 200.0, 300);
        assert_eq!(series.to_vector(0), vec![200.0]);
        assert_eq!(series.target_len(), 1);
        assert!(series.is_ready());

        series.update(0, 201.0, 365);
        assert_eq!(series.to_vector(0), vec![200.0, 201.0]);
        assert_eq!(series.target_len(), 2);
    }

    #[test]
    fn test_periodic_gap_across_boundary_drops_previous_period() {
        let mut series = BucketedSeries::new(5, T, SeriesMode::Periodic, 1).unwrap();
        series.update(0, 1.0, 120);
        series.update(0, 2.0, 420);

        assert_eq!(buckets(&series, 0), vec![300, 360, 420]);
        assert_eq!(series.to_vector(0), vec![1.0, 1.0, 2.0]);
        assert_eq!(series.target_len(), 3);
    }

    #[test]
    fn test_periodic_partial_first_period_not_ready() {
        let mut series = BucketedSeries::new(5, T, SeriesMode::Periodic, 1).unwrap();
        series.update(0, 1.0, 150);

        assert_eq!(series.watermarks().start_time, 0);
        assert_eq!(series.target_len(), 3);
        assert!(!series.is_ready());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut series = BucketedSeries::new(5, T, SeriesMode::Periodic, 2).unwrap();
        series.update(0, 1.0, 300);
        series.update(1, 1.0, 360);
        series.reset();

        assert_eq!(series.len(0), 0);
        assert_eq!(series.len(1), 0);
        assert_eq!(series.target_len(), 0);
        assert_eq!(series.watermarks(), Watermarks::default());
        assert!(!series.is_ready());
        assert!(series.update(0, 2.0, 60));
    }
}
