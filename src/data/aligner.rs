/// Multi-symbol bucket aligner with ordered, delay-annotated dispatch
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::data::bar_series::validate_symbol_count;
use crate::data::bucket_queue::{BucketQueue, Placement};
use crate::error::{EngineError, Result};
use crate::events::{DispatchEvent, DispatchHandler, PriceType};
use crate::time::{bucket, bucket_datetime, millis_to_secs};
use crate::types::{AlignedRecord, Watermarks};

/// Watches one record queue per symbol and flushes buckets once every
/// symbol has reached the global bucket watermark.
///
/// Updates take millisecond wall-clock timestamps; buckets are in seconds.
/// Each queue holds at most `window_size` unflushed closed buckets plus the
/// open one.
pub struct MultiSymbolAligner {
    queues: Vec<BucketQueue<AlignedRecord>>,
    touched: Vec<bool>,
    window_size: usize,
    timeframe: u64,
    marks: Watermarks,
    handler: Option<DispatchHandler>,
    auto_calc: bool,
}

impl MultiSymbolAligner {
    pub fn new(window_size: usize, timeframe_secs: u64, symbol_count: usize) -> Result<Self> {
        validate_symbol_count(symbol_count)?;
        if window_size == 0 {
            return Err(EngineError::InvalidParameter("window_size must be > 0".to_string()));
        }
        if timeframe_secs == 0 {
            return Err(EngineError::InvalidParameter("timeframe must be > 0".to_string()));
        }
        if (window_size as u64).checked_mul(timeframe_secs).is_none() {
            return Err(EngineError::InvalidParameter(format!(
                "window_size {} * timeframe {} overflows",
                window_size, timeframe_secs
            )));
        }

        let queues = (0..symbol_count)
            .map(|_| BucketQueue::new(timeframe_secs, window_size + 1))
            .collect();

        info!(
            "Created aligner: {} symbols, {}s buckets, {} closed buckets retained",
            symbol_count, timeframe_secs, window_size
        );

        Ok(MultiSymbolAligner {
            queues,
            touched: vec![false; symbol_count],
            window_size,
            timeframe: timeframe_secs,
            marks: Watermarks::default(),
            handler: None,
            auto_calc: false,
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let mut aligner = Self::new(
            config.window_size,
            config.timeframe_secs,
            config.symbols.len(),
        )?;
        aligner.auto_calc = config.auto_calc;
        Ok(aligner)
    }

    /// Register the single dispatch consumer, replacing any previous one
    pub fn set_handler(&mut self, handler: DispatchHandler) {
        self.handler = Some(handler);
    }

    pub fn clear_handler(&mut self) {
        self.handler = None;
    }

    /// Run `calc()` after every accepted update
    pub fn set_auto_calc(&mut self, auto_calc: bool) {
        self.auto_calc = auto_calc;
    }

    /// Record a tick for symbol `index` arriving at `wall_time_ms`
    pub fn try_update(&mut self, index: usize, value: f64, wall_time_ms: u64) -> Result<Placement> {
        let count = self.queues.len();
        let queue = self
            .queues
            .get_mut(index)
            .ok_or(EngineError::SymbolOutOfRange { index, count })?;

        let active = bucket(millis_to_secs(wall_time_ms), self.timeframe);
        if let Some(last_bucket) = queue.last_bucket() {
            if active < last_bucket {
                return Err(EngineError::NonMonotonic {
                    symbol: index,
                    last_bucket,
                    bucket: active,
                });
            }
        }

        self.marks.observe_wall_time(wall_time_ms);
        self.marks.observe_bucket(active);
        let span = self.window_size as u64 * self.timeframe;
        self.marks.advance_start(active.saturating_sub(span));

        let oldest = queue.front().map(|r| r.bucket);
        let placement = queue.place(
            AlignedRecord::observed(value, active, wall_time_ms),
            self.marks.start_time,
            |prev, next| AlignedRecord::carried(prev.value, next, wall_time_ms),
        );
        if let Placement::Appended { filled } = placement {
            if filled > 0 {
                debug!(symbol = index, bucket = active, filled, "Synthesized missing buckets");
            }
        }

        let evicted = queue.evict_before(self.marks.start_time);
        if evicted > 0 {
            warn!(
                symbol = index,
                evicted,
                from = oldest.unwrap_or_default(),
                until = self.marks.start_time,
                "Dropped buckets never flushed as Close; calc() is lagging the window"
            );
        }

        self.touched[index] = true;

        if self.auto_calc {
            self.calc();
        }

        Ok(placement)
    }

    /// Boolean form of [`MultiSymbolAligner::try_update`]; refusals are logged
    pub fn update(&mut self, index: usize, value: f64, wall_time_ms: u64) -> bool {
        match self.try_update(index, value, wall_time_ms) {
            Ok(_) => true,
            Err(e) => {
                warn!("Aligner update refused: {} ({})", e, e.error_code());
                false
            }
        }
    }

    /// Every symbol holds a record at the global bucket watermark
    pub fn is_ready(&self) -> bool {
        let watermark = self.marks.last_open_date;
        self.queues
            .iter()
            .all(|queue| queue.last_bucket().is_some_and(|b| b >= watermark))
    }

    /// Flush settled buckets and the open bucket to the dispatch handler.
    ///
    /// Returns false without side effects when no handler is registered or
    /// some symbol still trails the bucket watermark.
    pub fn calc(&mut self) -> bool {
        if self.handler.is_none() || !self.is_ready() {
            return false;
        }
        let Some(handler) = self.handler.as_mut() else {
            return false;
        };

        let min_len = self.queues.iter().map(BucketQueue::len).min().unwrap_or(0);

        // Records a symbol collected before its siblings existed cannot be aligned
        for (symbol, queue) in self.queues.iter_mut().enumerate() {
            let dropped = queue.keep_newest(min_len);
            if dropped > 0 {
                debug!(symbol, dropped, "Discarded unaligned leading records");
            }
        }

        let last_wall_time = self.marks.last_wall_time;
        let closed = min_len.saturating_sub(1);

        for _ in 0..closed {
            let is_gap = self
                .queues
                .iter()
                .all(|queue| queue.front().is_some_and(|r| r.synthesized));

            for (symbol, queue) in self.queues.iter().enumerate() {
                if let Some(record) = queue.front() {
                    debug_assert_eq!(Some(record.bucket), self.queues[0].front().map(|r| r.bucket));
                    handler(DispatchEvent {
                        symbol,
                        value: record.value,
                        bucket: record.bucket,
                        delay_ms: last_wall_time.saturating_sub(record.wall_time_ms),
                        price_type: PriceType::Close,
                        is_update: false,
                        is_gap,
                    });
                }
            }

            for queue in &mut self.queues {
                queue.pop_front();
            }
        }

        for (symbol, queue) in self.queues.iter().enumerate() {
            if let Some(record) = queue.back() {
                let is_update = std::mem::replace(&mut self.touched[symbol], false);
                handler(DispatchEvent {
                    symbol,
                    value: record.value,
                    bucket: record.bucket,
                    delay_ms: last_wall_time.saturating_sub(record.wall_time_ms),
                    price_type: PriceType::IntraBar,
                    is_update,
                    is_gap: false,
                });
            }
        }

        let open = self.marks.last_open_date;
        self.marks.advance_start(open);

        if closed > 0 {
            debug!(
                closed,
                open_bucket = %bucket_datetime(open).map(|t| t.to_rfc3339()).unwrap_or_default(),
                "Flushed aligned buckets"
            );
        }

        true
    }

    /// Queued records for symbol `index`, oldest first
    pub fn records(&self, index: usize) -> Vec<AlignedRecord> {
        self.queues
            .get(index)
            .map(|queue| queue.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, index: usize) -> usize {
        self.queues.get(index).map_or(0, BucketQueue::len)
    }

    pub fn symbol_count(&self) -> usize {
        self.queues.len()
    }

    pub fn watermarks(&self) -> Watermarks {
        self.marks
    }

    /// Clear queues, touched flags and watermarks; the handler stays registered
    pub fn reset(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
        self.touched.iter_mut().for_each(|t| *t = false);
        self.marks = Watermarks::default();
        info!("Aligner reset ({} symbols)", self.queues.len());
    }
}

/// Thread-safe wrapper for MultiSymbolAligner
///
/// `calc` holds the write lock while the handler runs; a handler must not
/// call back into any clone of this wrapper or it will deadlock.
#[derive(Clone)]
pub struct ConcurrentAligner {
    aligner: Arc<RwLock<MultiSymbolAligner>>,
}

impl ConcurrentAligner {
    pub fn new(aligner: MultiSymbolAligner) -> Self {
        ConcurrentAligner {
            aligner: Arc::new(RwLock::new(aligner)),
        }
    }

    pub async fn set_handler(&self, handler: DispatchHandler) {
        let mut aligner = self.aligner.write().await;
        aligner.set_handler(handler);
    }

    pub async fn update(&self, index: usize, value: f64, wall_time_ms: u64) -> bool {
        let mut aligner = self.aligner.write().await;
        aligner.update(index, value, wall_time_ms)
    }

    pub async fn calc(&self) -> bool {
        let mut aligner = self.aligner.write().await;
        aligner.calc()
    }

    pub async fn is_ready(&self) -> bool {
        let aligner = self.aligner.read().await;
        aligner.is_ready()
    }

    pub async fn watermarks(&self) -> Watermarks {
        let aligner = self.aligner.read().await;
        aligner.watermarks()
    }

    pub async fn reset(&self) {
        let mut aligner = self.aligner.write().await;
        aligner.reset();
    }
}
