use std::iter::FusedIterator;
use std::mem;

use crate::block::Block;
use crate::error::{check_range, Result};
use crate::range_map::RangeMap;
use crate::HugeList;

/// A run of consecutive elements stored in one segment, with the index of its first element.
#[derive(Debug)]
pub struct Chunk<'a, T> {
    pub start: usize,
    pub items: &'a [T],
}

impl<'a, T> Chunk<'a, T> {
    /// One past the index of the last element.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.items.len()
    }
}

impl<'a, T> Clone for Chunk<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Chunk<'a, T> {}

/// Ascending iterator over the segments of a [`HugeList`][crate::HugeList], clipped to a range.
pub struct Chunks<'a, T: 'a, M: RangeMap<Block<T>> + 'a> {
    entries: <M as RangeMap<Block<T>>>::Entries<'a>,
    from: usize,
    to: usize,
}

impl<'a, T: 'a, M: RangeMap<Block<T>> + 'a> Iterator for Chunks<'a, T, M> {
    type Item = Chunk<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.from >= self.to {
            return None;
        }
        let entry = self.entries.next()?;
        let lo = self.from.max(entry.start) - entry.start;
        let hi = self.to.min(entry.end()) - entry.start;
        self.from = entry.end();
        Some(Chunk {
            start: entry.start + lo,
            items: &entry.value.as_slice()[lo..hi],
        })
    }
}

impl<'a, T: 'a, M: RangeMap<Block<T>> + 'a> FusedIterator for Chunks<'a, T, M> {}

/// Descending iterator over the segments of a [`HugeList`][crate::HugeList], clipped to a range.
pub struct ChunksRev<'a, T: 'a, M: RangeMap<Block<T>> + 'a> {
    entries: <M as RangeMap<Block<T>>>::EntriesRev<'a>,
    from: usize,
    to: usize,
}

impl<'a, T: 'a, M: RangeMap<Block<T>> + 'a> Iterator for ChunksRev<'a, T, M> {
    type Item = Chunk<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.from >= self.to {
            return None;
        }
        let entry = self.entries.next()?;
        let lo = self.from.max(entry.start) - entry.start;
        let hi = self.to.min(entry.end()) - entry.start;
        self.to = entry.start;
        Some(Chunk {
            start: entry.start + lo,
            items: &entry.value.as_slice()[lo..hi],
        })
    }
}

impl<'a, T: 'a, M: RangeMap<Block<T>> + 'a> FusedIterator for ChunksRev<'a, T, M> {}

impl<T, M: RangeMap<Block<T>>> HugeList<T, M> {
    pub(crate) fn chunks_in_unchecked(&self, index: usize, count: usize) -> Chunks<'_, T, M> {
        Chunks {
            entries: self.map.entries_from(index),
            from: index,
            to: index + count,
        }
    }

    pub(crate) fn chunks_rev_in_unchecked(&self, index: usize, count: usize) -> ChunksRev<'_, T, M> {
        let to = index + count;
        ChunksRev {
            entries: self.map.entries_rev_from(to.saturating_sub(1)),
            from: index,
            to,
        }
    }

    /// Iterates over the segments in order, one slice per segment.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = HugeList::with_block_size(4);
    /// v.add_range(0..10).unwrap();
    /// let lens: Vec<_> = v.chunks().map(|c| c.items.len()).collect();
    /// assert_eq!(lens.iter().sum::<usize>(), 10);
    /// assert!(lens.iter().all(|&l| l <= 4));
    /// ```
    pub fn chunks(&self) -> Chunks<'_, T, M> {
        self.chunks_in_unchecked(0, self.len())
    }

    /// Iterates over the segments from last to first, one slice per segment.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = HugeList::with_block_size(4);
    /// v.add_range(0..10).unwrap();
    /// let starts: Vec<_> = v.chunks_rev().map(|c| c.start).collect();
    /// assert_eq!(starts, vec![8, 4, 0]);
    /// ```
    pub fn chunks_rev(&self) -> ChunksRev<'_, T, M> {
        self.chunks_rev_in_unchecked(0, self.len())
    }

    /// Like [`chunks`][HugeList::chunks], restricted to `[index, index + count)`.
    pub fn chunks_range(&self, index: usize, count: usize) -> Result<Chunks<'_, T, M>> {
        check_range("HugeList::chunks_range", index, count, self.len())?;
        Ok(self.chunks_in_unchecked(index, count))
    }

    /// Calls `f` with each piece of `[index, index + count)` that lives in one segment.
    pub(crate) fn walk_mut<F>(&mut self, index: usize, count: usize, mut f: F)
    where
        F: FnMut(&mut [T]),
    {
        let end = index + count;
        let mut pos = index;
        while pos < end {
            let (start, length) = self.locate(pos);
            let stop = end.min(start + length);
            let block = self.block_mut(start);
            f(&mut block.as_mut_slice()[pos - start..stop - start]);
            pos = stop;
        }
    }

    /// Copies `count` elements starting at `index` into `dest[dest_offset..]`.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let v: HugeList<i32> = (0..10).collect();
    /// let mut buf = [0; 4];
    /// v.copy_to(3, &mut buf, 1, 3).unwrap();
    /// assert_eq!(buf, [0, 3, 4, 5]);
    /// ```
    pub fn copy_to(&self, index: usize, dest: &mut [T], dest_offset: usize, count: usize) -> Result<()>
    where
        T: Clone,
    {
        let caller = "HugeList::copy_to";
        check_range(caller, index, count, self.len())?;
        let end = check_range(caller, dest_offset, count, dest.len())?;
        let mut dest = &mut dest[dest_offset..end];
        for chunk in self.chunks_in_unchecked(index, count) {
            let (head, rest) = mem::take(&mut dest).split_at_mut(chunk.items.len());
            head.clone_from_slice(chunk.items);
            dest = rest;
        }
        Ok(())
    }

    /// Calls `f` on every element of `[index, index + count)`, in order.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = (0..5).collect();
    /// v.iterate_range(1, 3, |x| *x *= 10).unwrap();
    /// assert_eq!(v.to_vec(), vec![0, 10, 20, 30, 4]);
    /// ```
    pub fn iterate_range<F>(&mut self, index: usize, count: usize, mut f: F) -> Result<()>
    where
        F: FnMut(&mut T),
    {
        check_range("HugeList::iterate_range", index, count, self.len())?;
        self.walk_mut(index, count, |chunk| chunk.iter_mut().for_each(&mut f));
        Ok(())
    }

    /// Like [`iterate_range`][HugeList::iterate_range], pairing every element with the matching
    /// element of `x[x_offset..x_offset + count]`.
    pub fn iterate_range_with<X, F>(
        &mut self,
        index: usize,
        count: usize,
        x: &mut [X],
        x_offset: usize,
        mut f: F,
    ) -> Result<()>
    where
        F: FnMut(&mut T, &mut X),
    {
        let caller = "HugeList::iterate_range_with";
        check_range(caller, index, count, self.len())?;
        let end = check_range(caller, x_offset, count, x.len())?;
        let mut xs = x[x_offset..end].iter_mut();
        self.walk_mut(index, count, |chunk| {
            for (v, x) in chunk.iter_mut().zip(&mut xs) {
                f(v, x);
            }
        });
        Ok(())
    }

    /// Calls `f` once per segment with the part of `[index, index + count)` stored there.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<u8> = HugeList::with_block_size(3);
    /// v.add_range(0..8).unwrap();
    /// let mut calls = 0;
    /// v.iterate_range_batch(0, 8, |batch| {
    ///     calls += 1;
    ///     batch.reverse();
    /// })
    /// .unwrap();
    /// assert_eq!(calls, v.segment_count());
    /// ```
    pub fn iterate_range_batch<F>(&mut self, index: usize, count: usize, f: F) -> Result<()>
    where
        F: FnMut(&mut [T]),
    {
        check_range("HugeList::iterate_range_batch", index, count, self.len())?;
        self.walk_mut(index, count, f);
        Ok(())
    }

    /// Like [`iterate_range_batch`][HugeList::iterate_range_batch], handing `f` the matching
    /// window of `x[x_offset..x_offset + count]` with every batch.
    pub fn iterate_range_batch_with<X, F>(
        &mut self,
        index: usize,
        count: usize,
        x: &mut [X],
        x_offset: usize,
        mut f: F,
    ) -> Result<()>
    where
        F: FnMut(&mut [T], &mut [X]),
    {
        let caller = "HugeList::iterate_range_batch_with";
        check_range(caller, index, count, self.len())?;
        let end = check_range(caller, x_offset, count, x.len())?;
        let mut xs = &mut x[x_offset..end];
        self.walk_mut(index, count, |chunk| {
            let (head, rest) = mem::take(&mut xs).split_at_mut(chunk.len());
            f(chunk, head);
            xs = rest;
        });
        Ok(())
    }
}
