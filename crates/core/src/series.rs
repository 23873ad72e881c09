//! Fixed-capacity rolling window of timestamped readings.
//!
//! Backs the dashboard charts. Appends go to the tail; once the buffer is
//! full the oldest entries are evicted from the head, so the window always
//! holds the most recent `capacity` readings in chronological order.

use std::collections::VecDeque;

use chrono::Duration;
use serde::Serialize;

use crate::error::CoreError;
use crate::reading::Reading;
use crate::types::Timestamp;

/// Default number of points kept for charting.
pub const DEFAULT_CAPACITY: usize = 100;

/// Largest window a buffer accepts (a little over a day at one point per second).
pub const MAX_CAPACITY: usize = 100_000;

/// Spacing of the placeholder points written by [`SeriesBuffer::seeded`].
const SEED_SPACING_SECS: i64 = 1;

/// One point of the rolling series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: Timestamp,
    pub reading: Reading,
}

#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    capacity: usize,
    points: VecDeque<SeriesPoint>,
}

impl SeriesBuffer {
    /// Create an empty buffer. Capacities outside `1..=MAX_CAPACITY` are
    /// rejected.
    pub fn new(capacity: usize) -> Result<Self, CoreError> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(CoreError::Validation(format!(
                "series capacity must be between 1 and {MAX_CAPACITY}, got {capacity}"
            )));
        }
        Ok(Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        })
    }

    /// Create a full buffer of zero readings spaced one second apart, the
    /// last one stamped `now`, so early charts span the whole window.
    pub fn seeded(capacity: usize, now: Timestamp) -> Result<Self, CoreError> {
        let mut buffer = Self::new(capacity)?;
        for i in 0..capacity {
            let age = (capacity - 1 - i) as i64 * SEED_SPACING_SECS;
            buffer.points.push_back(SeriesPoint {
                timestamp: now - Duration::seconds(age),
                reading: Reading::zero(),
            });
        }
        Ok(buffer)
    }

    /// Add a point at the tail, evicting from the head past capacity.
    pub fn append(&mut self, timestamp: Timestamp, reading: Reading) {
        self.points.push_back(SeriesPoint { timestamp, reading });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Chronological copy of the window.
    pub fn snapshot(&self) -> Vec<SeriesPoint> {
        self.points.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
