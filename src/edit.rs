//! Segment bookkeeping behind every structural change of a [`HugeList`][crate::HugeList].
//!
//! Two rules are restored before any public operation returns: neighbouring segments never fit
//! into one block, and at most one segment (the one recorded in `slack`) has spare capacity.
//! Every helper here keeps the recorded slack key at or before the position being edited, so
//! the shifts performed by the range map never move it.

use log::trace;
use num_integer::Integer;

use crate::block::{inner::Storage, Block};
use crate::error::{check_range, HugeListError, Result};
use crate::range_map::RangeMap;
use crate::HugeList;

impl<T, M: RangeMap<Block<T>>> HugeList<T, M> {
    /// `(start, length)` of the segment holding `index`.
    pub(crate) fn locate(&self, index: usize) -> (usize, usize) {
        match self.map.nearest_less_or_equal(index) {
            Some(entry) => (entry.start, entry.length),
            None => unreachable!("no segment holds index {}", index),
        }
    }

    pub(crate) fn block(&self, start: usize) -> &Block<T> {
        match self.map.get(start) {
            Some((_, block)) => block,
            None => unreachable!("no segment starts at {}", start),
        }
    }

    pub(crate) fn block_mut(&mut self, start: usize) -> &mut Block<T> {
        match self.map.get_mut(start) {
            Some((_, block)) => block,
            None => unreachable!("no segment starts at {}", start),
        }
    }

    fn insert_block(&mut self, start: usize, block: Block<T>) {
        let length = block.len();
        if self.map.insert(start, length, block).is_err() {
            unreachable!("{} is not a segment boundary", start)
        }
    }

    fn remove_block(&mut self, start: usize) -> Block<T> {
        match self.map.remove(start) {
            Some((_, block)) => {
                if self.slack == Some(start) {
                    self.slack = None;
                }
                block
            }
            None => unreachable!("no segment starts at {}", start),
        }
    }

    fn resize(&mut self, start: usize, length: usize) {
        if !self.map.set_length(start, length) {
            unreachable!("cannot resize segment at {} to {}", start, length)
        }
    }

    /// Releases the spare capacity of the slack segment, if there is one.
    pub(crate) fn trim_slack(&mut self) {
        if let Some(start) = self.slack.take() {
            if self.block_mut(start).trim() {
                trace!("trimmed slack segment at {}", start);
            }
        }
    }

    fn release_slack_unless(&mut self, keep: Option<usize>) {
        if self.slack.is_some() && self.slack != keep {
            self.trim_slack();
        }
    }

    /// Brings the slack record in line with the segment at `start` after its capacity or length
    /// changed.
    fn settle(&mut self, start: usize) {
        if self.block(start).has_slack() {
            if self.slack != Some(start) {
                self.trim_slack();
                self.slack = Some(start);
            }
        } else if self.slack == Some(start) {
            self.slack = None;
        }
    }

    /// Makes `index` the end of a segment. Returns the start of that segment, or `None` when
    /// `index` is 0 or the list is empty, together with the items split off an interior segment.
    fn open_gap(&mut self, index: usize) -> (Option<usize>, Option<Storage<T>>) {
        let (start, length) = match self.map.nearest_less_or_equal(index) {
            Some(entry) => (entry.start, entry.length),
            None => return (None, None),
        };
        if index == start {
            let prev = self.map.nearest_less(index).map(|e| e.start);
            self.release_slack_unless(prev);
            (prev, None)
        } else if index == start + length {
            self.release_slack_unless(Some(start));
            (Some(start), None)
        } else {
            self.release_slack_unless(Some(start));
            let offset = index - start;
            let tail = self.block_mut(start).split_off(offset);
            self.resize(start, offset);
            trace!("split segment at {}: {} + {}", start, offset, tail.len());
            (Some(start), Some(tail))
        }
    }

    /// Fails unless `count` items can be inserted at `index`.
    pub(crate) fn check_insert(&self, caller: &'static str, index: usize, count: usize) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(HugeListError::OutOfBounds { caller, index, len });
        }
        if len.checked_add(count).is_none() {
            return Err(HugeListError::Overflow { caller });
        }
        Ok(())
    }

    /// Inserts the first `count` items of `items` at `index`. `items` must not run caller code:
    /// by the time it is pulled, a segment may already be split.
    ///
    /// Items go, in order: into the spare room of the segment ending at `index` (growing it to a
    /// full block), into freshly allocated full blocks, and finally into the front of the next
    /// segment if the remainder fits there, or a new slack segment otherwise.
    pub(crate) fn insert_exact<I>(
        &mut self,
        caller: &'static str,
        index: usize,
        count: usize,
        items: I,
    ) -> Result<()>
    where
        I: Iterator<Item = T>,
    {
        self.check_insert(caller, index, count)?;
        if count == 0 {
            return Ok(());
        }
        let max = self.max_block_size();

        let (prev, tail) = self.open_gap(index);
        let mut remaining = count + tail.as_ref().map_or(0, |t| t.len());
        let mut source = items.take(count).chain(tail.into_iter().flatten());
        let mut pos = index;

        if let Some(prev) = prev {
            let prev_len = self.block(prev).len();
            let room = max - prev_len;
            if room > 0 {
                let take = remaining.min(room);
                let block = self.block_mut(prev);
                block.reserve_to(max);
                block.fill_from(&mut source, take);
                self.resize(prev, prev_len + take);
                self.settle(prev);
                remaining -= take;
                pos = prev + prev_len + take;
            }
        }

        let (full, rest) = remaining.div_rem(&max);
        for _ in 0..full {
            let mut block = Block::with_capacity(max);
            block.fill_from(&mut source, max);
            self.insert_block(pos, block);
            pos += max;
        }

        if rest > 0 {
            match self.map.get(pos).map(|(length, _)| length) {
                Some(next_len) if next_len + rest <= max => {
                    let block = self.block_mut(pos);
                    block.reserve_to(max);
                    block.prepend_from(&mut source, rest);
                    self.resize(pos, next_len + rest);
                }
                _ => {
                    let mut block = Block::with_capacity(max);
                    block.fill_from(&mut source, rest);
                    self.insert_block(pos, block);
                }
            }
            self.settle(pos);
        }

        self.version += 1;
        trace!(
            "inserted {} items at {} ({} full blocks, {} left over)",
            count,
            index,
            full,
            rest
        );
        Ok(())
    }

    /// Removes `[index, index + count)`, handing every removed item to `sink` in order. The range
    /// must already be validated.
    pub(crate) fn remove_exact<F>(&mut self, index: usize, count: usize, sink: &mut F)
    where
        F: FnMut(T),
    {
        if count == 0 {
            return;
        }
        let end = index + count;
        let (first, first_len) = self.locate(index);
        self.release_slack_unless(Some(first));
        let offset = index - first;

        if end < first + first_len {
            self.block_mut(first)
                .drain_into(offset..offset + count, sink);
            self.resize(first, first_len - count);
            self.settle(first);
        } else {
            if offset == 0 {
                let block = self.remove_block(first);
                block.into_storage().into_iter().for_each(&mut *sink);
            } else {
                self.block_mut(first).drain_into(offset..first_len, sink);
                self.resize(first, offset);
                self.settle(first);
            }
            // everything behind the cut now starts at `index`
            let mut left = end - (first + first_len);
            while left > 0 {
                let (_, length) = self.locate(index);
                if length <= left {
                    let block = self.remove_block(index);
                    block.into_storage().into_iter().for_each(&mut *sink);
                    left -= length;
                } else {
                    self.block_mut(index).drain_into(0..left, sink);
                    self.resize(index, length - left);
                    self.settle(index);
                    left = 0;
                }
            }
        }

        self.version += 1;
        trace!("removed {} items at {}", count, index);
        self.coalesce_around(index);
    }

    /// Joins the segments around a cut at `index` wherever two neighbours fit into one block.
    fn coalesce_around(&mut self, index: usize) {
        if index > 0 {
            let (before, _) = self.locate(index - 1);
            if let Some(prev) = self.map.nearest_less(before).map(|e| e.start) {
                self.try_join(prev);
            }
            let (before, _) = self.locate(index - 1);
            self.try_join(before);
        }
        if index < self.len() {
            let (at, _) = self.locate(index);
            self.try_join(at);
        }
    }

    /// Merges the segment at `start` with its successor if both fit into one block. Returns
    /// `true` if they were merged.
    pub(crate) fn try_join(&mut self, start: usize) -> bool {
        let (len_a, cap_a) = match self.map.get(start) {
            Some((length, block)) => (length, block.capacity()),
            None => return false,
        };
        let next = start + len_a;
        let (len_b, cap_b) = match self.map.get(next) {
            Some((length, block)) => (length, block.capacity()),
            None => return false,
        };
        let max = self.max_block_size();
        let total = len_a + len_b;
        if total > max {
            return false;
        }

        if cap_a < total && cap_b >= total {
            // the successor has room for both; its key drops to `start`
            let next_was_slack = self.slack == Some(next);
            let head = self.remove_block(start);
            let mut items = head.into_storage().into_iter();
            self.block_mut(start).prepend_from(&mut items, len_a);
            if next_was_slack {
                self.slack = Some(start);
            }
        } else {
            let mut tail = self.remove_block(next);
            let block = self.block_mut(start);
            if cap_a < total {
                block.reserve_to(max);
            }
            block.append(&mut tail);
        }
        self.resize(start, total);
        self.settle(start);
        trace!("joined segments at {} and {} into {} items", start, next, total);
        true
    }

    /// Removes every element matching `pred` and returns how many were removed.
    ///
    /// Runs a single pass over the segments, compacting each one in place and merging it into
    /// its predecessor when the two fit into one block.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = HugeList::with_block_size(4);
    /// v.add_range(0..20).unwrap();
    /// assert_eq!(v.remove_all(|x| x % 3 != 0), 13);
    /// assert_eq!(v.to_vec(), vec![0, 3, 6, 9, 12, 15, 18]);
    /// assert!(v.validate().is_ok());
    /// ```
    pub fn remove_all<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.trim_slack();
        let mut pass = RemoveAll {
            list: self,
            start: 0,
            prev: None,
            removed: 0,
        };
        pass.run(&mut pred);
        pass.removed
    }

    /// Replaces the `count` elements at `index` with the items of `items`, which may be more or
    /// fewer than `count`.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = (0..6).collect();
    /// v.replace_range(1, 3, [10, 20]).unwrap();
    /// assert_eq!(v.to_vec(), vec![0, 10, 20, 4, 5]);
    /// v.replace_range(0, 1, [7, 8, 9]).unwrap();
    /// assert_eq!(v.to_vec(), vec![7, 8, 9, 10, 20, 4, 5]);
    /// ```
    pub fn replace_range<I>(&mut self, index: usize, count: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let caller = "HugeList::replace_range";
        check_range(caller, index, count, self.len())?;
        let items: Storage<T> = items.into_iter().collect();
        let new_count = items.len();
        self.replace_exact(caller, index, count, new_count, items.into_iter())
    }

    /// Replaces the `count` elements at `index` with clones of
    /// `source[offset..offset + new_count]`.
    pub fn replace_slice(
        &mut self,
        index: usize,
        count: usize,
        source: &[T],
        offset: usize,
        new_count: usize,
    ) -> Result<()>
    where
        T: Clone,
    {
        let caller = "HugeList::replace_slice";
        check_range(caller, index, count, self.len())?;
        let end = check_range(caller, offset, new_count, source.len())?;
        let items: Storage<T> = source[offset..end].iter().cloned().collect();
        self.replace_exact(caller, index, count, new_count, items.into_iter())
    }

    fn replace_exact<I>(
        &mut self,
        caller: &'static str,
        index: usize,
        count: usize,
        new_count: usize,
        mut items: I,
    ) -> Result<()>
    where
        I: Iterator<Item = T>,
    {
        if new_count > count && (self.len() - count).checked_add(new_count).is_none() {
            return Err(HugeListError::Overflow { caller });
        }
        let common = count.min(new_count);
        self.walk_mut(index, common, |chunk| {
            for (slot, val) in chunk.iter_mut().zip(&mut items) {
                *slot = val;
            }
        });
        if count > common {
            self.remove_exact(index + common, count - common, &mut drop);
        } else if new_count > common {
            self.insert_exact(caller, index + common, new_count - common, items)?;
        }
        Ok(())
    }
}

/// One compacting pass of [`HugeList::remove_all`]. Dropping it finishes the pass, so a panicking
/// predicate still leaves a valid layout behind.
struct RemoveAll<'a, T, M: RangeMap<Block<T>>> {
    list: &'a mut HugeList<T, M>,
    start: usize,
    prev: Option<usize>,
    removed: usize,
}

impl<T, M: RangeMap<Block<T>>> RemoveAll<'_, T, M> {
    fn run<F>(&mut self, pred: &mut F)
    where
        F: FnMut(&T) -> bool,
    {
        let list = &mut *self.list;
        while self.start < list.len() {
            let start = self.start;
            let block = list.block_mut(start);
            let before = block.len();
            block.retain(|v| !pred(v));
            let after = block.len();
            self.removed += before - after;

            if after == 0 {
                // the next segment slides down to `start`
                list.remove_block(start);
                continue;
            }
            if after < before {
                list.resize(start, after);
            }
            if let Some(p) = self.prev {
                if list.try_join(p) {
                    self.start = p + list.block(p).len();
                    continue;
                }
            }
            list.settle(start);
            self.prev = Some(start);
            self.start += after;
        }
    }
}

impl<T, M: RangeMap<Block<T>>> Drop for RemoveAll<'_, T, M> {
    fn drop(&mut self) {
        // after an unwind the last compacted segment may fit together with the untouched next one
        if let Some(p) = self.prev {
            self.list.try_join(p);
        }
        if self.removed > 0 {
            self.list.version += 1;
            trace!("removed {} matching items", self.removed);
        }
    }
}
