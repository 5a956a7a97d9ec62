use std::fmt::Debug;
use std::iter::FusedIterator;

use crate::range_map::{Entry, RangeMap};

/// Flat [`RangeMap`][crate::RangeMap] keeping ranges in a start-sorted vector.
///
/// Lookups binary-search the start table; inserts, removes and length changes rewrite the starts
/// of every later range, so structural updates are `O(n)`. Cheaper than a tree for lists that
/// never grow beyond a few dozen segments.
pub struct VecRangeMap<V> {
    starts: Vec<usize>,
    ranges: Vec<(usize, V)>,
    extent: usize,
}

impl<V> VecRangeMap<V> {
    pub fn new() -> Self {
        VecRangeMap {
            starts: Vec::new(),
            ranges: Vec::new(),
            extent: 0,
        }
    }

    // index of the range containing `position`, which must be below the extent
    fn slot(&self, position: usize) -> usize {
        self.starts.partition_point(|&s| s <= position) - 1
    }

    fn exact_slot(&self, start: usize) -> Option<usize> {
        self.starts.binary_search(&start).ok()
    }

    fn shift_after(&mut self, slot: usize, grow: usize, shrink: usize) {
        for s in &mut self.starts[slot + 1..] {
            *s = *s + grow - shrink;
        }
        self.extent = self.extent + grow - shrink;
    }
}

impl<V: Clone> Clone for VecRangeMap<V> {
    fn clone(&self) -> Self {
        VecRangeMap {
            starts: self.starts.clone(),
            ranges: self.ranges.clone(),
            extent: self.extent,
        }
    }
}

impl<V> Default for VecRangeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for VecRangeMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries_from(0)).finish()
    }
}

impl<V> RangeMap<V> for VecRangeMap<V> {
    type Entries<'a> = Entries<'a, V> where Self: 'a, V: 'a;
    type EntriesRev<'a> = EntriesRev<'a, V> where Self: 'a, V: 'a;

    fn extent(&self) -> usize {
        self.extent
    }

    fn len(&self) -> usize {
        self.ranges.len()
    }

    fn nearest_less_or_equal(&self, position: usize) -> Option<Entry<'_, V>> {
        if self.ranges.is_empty() {
            return None;
        }
        let slot = self.slot(position);
        let (length, value) = &self.ranges[slot];
        Some(Entry {
            start: self.starts[slot],
            length: *length,
            value,
        })
    }

    fn get(&self, start: usize) -> Option<(usize, &V)> {
        let slot = self.exact_slot(start)?;
        let (length, value) = &self.ranges[slot];
        Some((*length, value))
    }

    fn get_mut(&mut self, start: usize) -> Option<(usize, &mut V)> {
        let slot = self.exact_slot(start)?;
        let (length, value) = &mut self.ranges[slot];
        Some((*length, value))
    }

    fn insert(&mut self, start: usize, length: usize, value: V) -> Result<(), V> {
        if length == 0 {
            return Err(value);
        }
        let slot = if start == self.extent {
            self.ranges.len()
        } else {
            match self.exact_slot(start) {
                Some(slot) => slot,
                None => return Err(value),
            }
        };
        self.starts.insert(slot, start);
        self.ranges.insert(slot, (length, value));
        self.shift_after(slot, length, 0);
        Ok(())
    }

    fn remove(&mut self, start: usize) -> Option<(usize, V)> {
        let slot = self.exact_slot(start)?;
        let (length, value) = self.ranges.remove(slot);
        self.starts.remove(slot);
        // the removed slot is gone, so everything from `slot` on moves down
        for s in &mut self.starts[slot..] {
            *s -= length;
        }
        self.extent -= length;
        Some((length, value))
    }

    fn set_length(&mut self, start: usize, length: usize) -> bool {
        if length == 0 {
            return false;
        }
        match self.exact_slot(start) {
            Some(slot) => {
                let old = std::mem::replace(&mut self.ranges[slot].0, length);
                self.shift_after(slot, length, old);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.starts.clear();
        self.ranges.clear();
        self.extent = 0;
    }

    fn entries_from(&self, position: usize) -> Entries<'_, V> {
        let next = if position >= self.extent {
            self.ranges.len()
        } else {
            self.slot(position)
        };
        Entries { map: self, next }
    }

    fn entries_rev_from(&self, position: usize) -> EntriesRev<'_, V> {
        let remaining = if self.ranges.is_empty() {
            0
        } else {
            self.slot(position) + 1
        };
        EntriesRev {
            map: self,
            remaining,
        }
    }
}

/// Ascending iterator over the ranges of a [`VecRangeMap`].
pub struct Entries<'a, V> {
    map: &'a VecRangeMap<V>,
    next: usize,
}

impl<'a, V> Iterator for Entries<'a, V> {
    type Item = Entry<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let (length, value) = self.map.ranges.get(self.next)?;
        let start = self.map.starts[self.next];
        self.next += 1;
        Some(Entry {
            start,
            length: *length,
            value,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.map.ranges.len() - self.next;
        (left, Some(left))
    }
}

impl<'a, V> FusedIterator for Entries<'a, V> {}
impl<'a, V> ExactSizeIterator for Entries<'a, V> {}

/// Descending iterator over the ranges of a [`VecRangeMap`].
pub struct EntriesRev<'a, V> {
    map: &'a VecRangeMap<V>,
    remaining: usize,
}

impl<'a, V> Iterator for EntriesRev<'a, V> {
    type Item = Entry<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let (length, value) = &self.map.ranges[self.remaining];
        Some(Entry {
            start: self.map.starts[self.remaining],
            length: *length,
            value,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V> FusedIterator for EntriesRev<'a, V> {}
impl<'a, V> ExactSizeIterator for EntriesRev<'a, V> {}
