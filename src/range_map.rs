//! The ordered range map [`HugeList`][crate::HugeList] stores its segments in.
//!
//! A range map partitions `[0, extent)` into contiguous, non-overlapping ranges. Every range
//! carries a length and a value and is addressed by its start, which always equals the summed
//! lengths of the ranges before it. Inserting or removing a range therefore shifts the starts of
//! all ranges behind it.

use std::mem;

pub use crate::avl_map::AvlRangeMap;
pub use crate::vec_map::VecRangeMap;

/// A borrowed view of one range.
#[derive(Debug)]
pub struct Entry<'a, V> {
    pub start: usize,
    pub length: usize,
    pub value: &'a V,
}

impl<'a, V> Entry<'a, V> {
    /// One past the last position covered by the range.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

impl<'a, V> Copy for Entry<'a, V> {}

impl<'a, V> Clone for Entry<'a, V> {
    fn clone(&self) -> Self {
        *self
    }
}

/// Position-keyed ordered collection of ranges.
///
/// Implementations must keep the ranges gapless and must reject zero-length ranges, since a
/// zero-length range would share its start with its successor.
pub trait RangeMap<V> {
    /// Ascending iterator returned by [`entries_from`][RangeMap::entries_from].
    type Entries<'a>: Iterator<Item = Entry<'a, V>>
    where
        Self: 'a,
        V: 'a;

    /// Descending iterator returned by [`entries_rev_from`][RangeMap::entries_rev_from].
    type EntriesRev<'a>: Iterator<Item = Entry<'a, V>>
    where
        Self: 'a,
        V: 'a;

    /// Total length of all ranges.
    fn extent(&self) -> usize;

    /// Number of ranges.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The range with the greatest start `<= position`, i.e. the range containing `position`.
    /// Positions at or past the extent resolve to the last range.
    fn nearest_less_or_equal(&self, position: usize) -> Option<Entry<'_, V>>;

    /// The range with the greatest start `< position`.
    fn nearest_less(&self, position: usize) -> Option<Entry<'_, V>> {
        match position {
            0 => None,
            p => self.nearest_less_or_equal(p - 1),
        }
    }

    /// The range with the least start `>= position`.
    fn nearest_greater_or_equal(&self, position: usize) -> Option<Entry<'_, V>> {
        let mut entries = self.entries_from(position);
        let first = entries.next()?;
        if first.start == position {
            Some(first)
        } else {
            entries.next()
        }
    }

    /// The range with the least start `> position`.
    fn nearest_greater(&self, position: usize) -> Option<Entry<'_, V>> {
        self.nearest_greater_or_equal(position.checked_add(1)?)
    }

    /// The range starting exactly at `start`, as `(length, value)`.
    fn get(&self, start: usize) -> Option<(usize, &V)> {
        if start >= self.extent() {
            return None;
        }
        self.nearest_less_or_equal(start)
            .filter(|e| e.start == start)
            .map(|e| (e.length, e.value))
    }

    fn get_mut(&mut self, start: usize) -> Option<(usize, &mut V)>;

    /// `true` if a range may be inserted at `start`.
    fn is_boundary(&self, start: usize) -> bool {
        start == self.extent() || self.get(start).is_some()
    }

    /// Inserts a range at `start`, shifting every range at or after `start` by `length`.
    ///
    /// Gives the value back if `start` is not a range boundary or `length` is zero.
    fn insert(&mut self, start: usize, length: usize, value: V) -> Result<(), V>;

    /// Removes the range starting at `start`, shifting every range after it down.
    fn remove(&mut self, start: usize) -> Option<(usize, V)>;

    /// Changes the length of the range at `start`, shifting every range after it.
    fn set_length(&mut self, start: usize, length: usize) -> bool;

    /// Replaces the value of the range at `start`, returning the old one.
    fn set_value(&mut self, start: usize, value: V) -> Result<V, V> {
        match self.get_mut(start) {
            Some((_, slot)) => Ok(mem::replace(slot, value)),
            None => Err(value),
        }
    }

    /// Replaces both length and value of the range at `start`.
    fn set(&mut self, start: usize, length: usize, value: V) -> Result<V, V> {
        if length == 0 || !self.set_length(start, length) {
            return Err(value);
        }
        self.set_value(start, value)
    }

    fn clear(&mut self);

    /// Ranges in ascending order, beginning with the one containing `position`. Empty when
    /// `position >= extent`.
    fn entries_from(&self, position: usize) -> Self::Entries<'_>;

    /// Ranges in descending order, beginning with the one containing `position`, or with the
    /// last range when `position >= extent`.
    fn entries_rev_from(&self, position: usize) -> Self::EntriesRev<'_>;
}
