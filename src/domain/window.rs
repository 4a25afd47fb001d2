//! Generic bounded rolling window with a cached reduction.
//!
//! A `RollingWindow` keeps the most recent `capacity` values in FIFO order.
//! Each push that leaves the window full re-runs the reducer over the entire
//! window contents (including the value just inserted) and caches the result.
//! Before the window has filled once, `latest()` is `None`; once full it
//! never reverts.

use std::collections::VecDeque;

use crate::domain::error::DualThrustError;

pub struct RollingWindow<T, V> {
    values: VecDeque<T>,
    capacity: usize,
    reduce: fn(&VecDeque<T>) -> V,
    latest: Option<V>,
}

impl<T, V: Clone> RollingWindow<T, V> {
    pub fn new(capacity: usize, reduce: fn(&VecDeque<T>) -> V) -> Result<Self, DualThrustError> {
        if capacity == 0 {
            return Err(DualThrustError::InvalidParameter {
                name: "window".into(),
                reason: "window size must be greater than 0".into(),
            });
        }
        Ok(Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
            reduce,
            latest: None,
        })
    }

    pub fn push(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
        if self.is_full() {
            self.latest = Some((self.reduce)(&self.values));
        }
    }

    pub fn latest(&self) -> Option<V> {
        self.latest.clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }
}
