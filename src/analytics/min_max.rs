/// Streaming sliding-window min/max over a monotonic deque
use std::collections::VecDeque;

/// Min and max of the last `window` pushed values, amortized O(1) per push
#[derive(Debug, Clone)]
pub struct MinMaxFilter {
    window: usize,
    count: u64,
    // (sequence, value), values increasing front to back
    mins: VecDeque<(u64, f64)>,
    // (sequence, value), values decreasing front to back
    maxs: VecDeque<(u64, f64)>,
}

impl MinMaxFilter {
    pub fn new(window: usize) -> Self {
        MinMaxFilter {
            window: window.max(1),
            count: 0,
            mins: VecDeque::new(),
            maxs: VecDeque::new(),
        }
    }

    pub fn push(&mut self, value: f64) {
        let seq = self.count;
        self.count += 1;

        while self.mins.back().is_some_and(|&(_, v)| v >= value) {
            self.mins.pop_back();
        }
        self.mins.push_back((seq, value));

        while self.maxs.back().is_some_and(|&(_, v)| v <= value) {
            self.maxs.pop_back();
        }
        self.maxs.push_back((seq, value));

        let oldest = self.count.saturating_sub(self.window as u64);
        while self.mins.front().is_some_and(|&(s, _)| s < oldest) {
            self.mins.pop_front();
        }
        while self.maxs.front().is_some_and(|&(s, _)| s < oldest) {
            self.maxs.pop_front();
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.mins.front().map(|&(_, v)| v)
    }

    pub fn max(&self) -> Option<f64> {
        self.maxs.front().map(|&(_, v)| v)
    }

    /// A full window has been observed
    pub fn is_warm(&self) -> bool {
        self.count >= self.window as u64
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.mins.clear();
        self.maxs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_brute_force() {
        let values = [5.0, 3.0, 8.0, 1.0, 9.0, 2.0, 2.0, 7.0, 4.0, 6.0];
        let window = 3;
        let mut filter = MinMaxFilter::new(window);

        for (i, v) in values.iter().enumerate() {
            filter.push(*v);
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            let min = slice.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = slice.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(filter.min(), Some(min), "min at {}", i);
            assert_eq!(filter.max(), Some(max), "max at {}", i);
        }
        assert!(filter.is_warm());
    }

    #[test]
    fn test_empty_and_reset() {
        let mut filter = MinMaxFilter::new(4);
        assert_eq!(filter.min(), None);
        filter.push(1.0);
        assert!(!filter.is_warm());
        filter.reset();
        assert_eq!(filter.max(), None);
    }
}
