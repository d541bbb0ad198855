//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: Float> Interval<T> {
    pub fn lerp(&self, t: T) -> T {
        self.min + t * (self.max - self.min)
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// A first-in first-out buffer with a fixed capacity.
///
/// The buffer starts out filled with default values, so it always holds
/// exactly `capacity` items; pushing a new item evicts the oldest one.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    items: Vec<T>,
    /// Index of the oldest item.
    head: usize,
}

impl<T: Clone + Default> RingBuffer<T> {
    /// Creates a buffer holding `capacity` default values.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: vec![T::default(); capacity],
            head: 0,
        }
    }
}

impl<T> RingBuffer<T> {
    /// The number of items held by the buffer.
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Pushes an item, evicting the oldest.
    pub fn push(&mut self, item: T) {
        if self.items.is_empty() {
            return;
        }
        self.items[self.head] = item;
        self.head = (self.head + 1) % self.items.len();
    }

    /// Iterates over the items from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (newer, older) = self.items.split_at(self.head);
        older.iter().chain(newer)
    }
}
