//! Bounded, newest-first reading history.

use std::collections::VecDeque;

/// One scalar sample from the `/data` endpoint.
pub type Reading = f64;

/// Maximum readings retained by default.
pub const HISTORY_CAPACITY: usize = 50;

/// Newest-first buffer of readings. Pushing at capacity evicts the oldest.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingHistory {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// A capacity of zero is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a reading at the head, dropping the tail if full.
    pub fn push(&mut self, reading: Reading) {
        self.readings.push_front(reading);
        self.readings.truncate(self.capacity);
    }

    /// Most recent reading, if any.
    pub fn latest(&self) -> Option<Reading> {
        self.readings.front().copied()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Readings newest-first.
    pub fn iter(&self) -> impl Iterator<Item = Reading> + '_ {
        self.readings.iter().copied()
    }

    /// Readings paired with their display number. The newest reading carries
    /// the highest number (`len`), the oldest retained one carries 1.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, Reading)> + '_ {
        let len = self.readings.len();
        self.readings
            .iter()
            .enumerate()
            .map(move |(i, &r)| (len - i, r))
    }

    pub fn to_vec(&self) -> Vec<Reading> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let h = ReadingHistory::new();
        assert!(h.is_empty());
        assert_eq!(h.latest(), None);
        assert_eq!(h.capacity(), 50);
    }

    #[test]
    fn newest_first() {
        let mut h = ReadingHistory::new();
        h.push(1.0);
        h.push(2.0);
        h.push(3.0);
        assert_eq!(h.to_vec(), vec![3.0, 2.0, 1.0]);
        assert_eq!(h.latest(), Some(3.0));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut h = ReadingHistory::new();
        for i in 0..200 {
            h.push(i as f64);
            assert!(h.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(h.len(), HISTORY_CAPACITY);
        assert_eq!(h.latest(), Some(199.0));
    }

    #[test]
    fn fifty_first_read_evicts_exactly_the_oldest() {
        let mut h = ReadingHistory::new();
        for i in 1..=50 {
            h.push(i as f64);
        }
        assert_eq!(h.len(), 50);
        assert_eq!(h.iter().last(), Some(1.0));

        h.push(51.0);
        assert_eq!(h.len(), 50);
        assert_eq!(h.latest(), Some(51.0));
        assert_eq!(h.iter().last(), Some(2.0));
        assert!(!h.iter().any(|r| r == 1.0));
    }

    #[test]
    fn numbering_counts_down_from_len() {
        let mut h = ReadingHistory::new();
        h.push(10.0);
        h.push(20.0);
        h.push(30.0);
        let numbered: Vec<_> = h.numbered().collect();
        assert_eq!(numbered, vec![(3, 30.0), (2, 20.0), (1, 10.0)]);
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let mut h = ReadingHistory::with_capacity(0);
        h.push(1.0);
        h.push(2.0);
        assert_eq!(h.to_vec(), vec![2.0]);
    }
}
