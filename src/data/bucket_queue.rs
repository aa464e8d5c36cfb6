/// Contiguous bucket queue shared by the series and the aligner
use std::collections::VecDeque;

use crate::types::{AlignedRecord, BarPoint};

/// Entry stored in a [`BucketQueue`]
pub trait Bucketed: Copy {
    fn bucket(&self) -> u64;
}

impl Bucketed for BarPoint {
    fn bucket(&self) -> u64 {
        self.bucket
    }
}

impl Bucketed for AlignedRecord {
    fn bucket(&self) -> u64 {
        self.bucket
    }
}

/// Outcome of placing an entry into the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Queue was empty
    First,
    /// Same bucket as the newest entry, value replaced in place
    Overwrite,
    /// New bucket appended after `filled` carried-forward entries
    Appended { filled: usize },
}

/// Ordered entries, oldest first, one per bucket with no holes.
///
/// Callers must reject buckets older than [`BucketQueue::last_bucket`]
/// before calling [`BucketQueue::place`].
#[derive(Debug, Clone)]
pub struct BucketQueue<T> {
    entries: VecDeque<T>,
    timeframe: u64,
}

impl<T: Bucketed> BucketQueue<T> {
    pub fn new(timeframe: u64, capacity: usize) -> Self {
        BucketQueue {
            entries: VecDeque::with_capacity(capacity),
            timeframe,
        }
    }

    /// Place `entry` at its bucket, synthesizing every skipped bucket at or
    /// after `floor` with `carry(previous, bucket)`.
    ///
    /// `floor` must be bucket-aligned. Skipped buckets below it are never
    /// materialized, so the caller must follow with `evict_before(floor)`
    /// to drop the entries stranded in front of the hole.
    pub fn place<F>(&mut self, entry: T, floor: u64, carry: F) -> Placement
    where
        F: Fn(&T, u64) -> T,
    {
        let last = match self.entries.back() {
            Some(last) => *last,
            None => {
                self.entries.push_back(entry);
                return Placement::First;
            }
        };

        if last.bucket() == entry.bucket() {
            if let Some(slot) = self.entries.back_mut() {
                *slot = entry;
            }
            return Placement::Overwrite;
        }

        let mut filled = 0;
        let mut next = (last.bucket() + self.timeframe).max(floor);
        while next < entry.bucket() {
            self.entries.push_back(carry(&last, next));
            next += self.timeframe;
            filled += 1;
        }
        self.entries.push_back(entry);

        Placement::Appended { filled }
    }

    /// Drop entries older than `start_time`, always keeping the newest one
    pub fn evict_before(&mut self, start_time: u64) -> usize {
        let mut evicted = 0;
        while self.entries.len() > 1 {
            match self.entries.front() {
                Some(front) if front.bucket() < start_time => {
                    self.entries.pop_front();
                    evicted += 1;
                }
                _ => break,
            }
        }
        evicted
    }

    /// Keep only the newest `len` entries
    pub fn keep_newest(&mut self, len: usize) -> usize {
        let excess = self.entries.len().saturating_sub(len);
        self.entries.drain(..excess);
        excess
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.entries.pop_front()
    }

    pub fn last_bucket(&self) -> Option<u64> {
        self.entries.back().map(Bucketed::bucket)
    }

    pub fn front(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.entries.back_mut()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
