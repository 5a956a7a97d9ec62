//! This crate provides the [`HugeList`][crate::HugeList] data structure.
//!
//! It behaves like a [`Vec`][std::vec::Vec] that supports cheap insertion and removal anywhere,
//! at the price of slower indexing. Elements live in bounded arrays referred to as "segments",
//! and the segments are kept in an ordered range map keyed by the position of their first element.
//! This involves a few trade-offs:
//!
//! #### Pros:
//!
//! - Inserting or removing a run of elements only moves data inside the touched segments, never
//!   the whole list.
//! - Memory is reclaimed as the list shrinks; at most one segment ever holds unused capacity.
//!
//! #### Cons:
//!
//! - Indexing costs `O(log n)` in the number of segments instead of `O(1)`.
//! - Direct slicing is unavailable (i.e. no `&[T]` or `&mut [T]`), though
//!   [`chunks`][crate::HugeList::chunks] exposes the segments one slice at a time.
//!
//! ## Structure
//!
//! Three invariants hold after every operation and are checked by
//! [`validate`][crate::HugeList::validate]:
//!
//! 1. No segment holds more than `max_block_size` elements.
//! 2. Two neighbouring segments never fit into one, i.e. their lengths sum to more than
//!    `max_block_size`. This bounds the segment count by `2 * len / max_block_size + 1`.
//! 3. At most one segment, the "slack" segment, has capacity beyond its length.
//!
//! ## Use Cases
//!
//! 1. You have a very long sequence that is edited in the middle, such as a text buffer or a
//!    log that is pruned in place.
//! 2. You need `Vec`-like indexing but cannot afford the `O(n)` shift of `Vec::insert`.

use std::{
    fmt::Debug,
    hash::Hash,
    iter::{FromIterator, FusedIterator},
    marker::PhantomData,
    mem,
    num::NonZeroUsize,
    ops::{Index, IndexMut},
};

#[cfg(test)]
mod tests;

mod avl_map;
mod block;
mod cursor;
mod edit;
mod error;
mod iterate;
pub mod range_map;
mod search;
mod validate;
mod vec_map;

pub use block::Block;
pub use cursor::{Cursor, CursorMode};
pub use error::{HugeListError, Result};
pub use iterate::{Chunk, Chunks, ChunksRev};
pub use range_map::{AvlRangeMap, Entry, RangeMap, VecRangeMap};
pub use search::Duplicates;

use block::inner::Storage;
use error::check_range;

/// Block size used by [`HugeList::new`][crate::HugeList::new].
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// A list that stores its elements in bounded segments indexed by an ordered range map.
///
/// Segments are allocated at exactly `max_block_size` capacity when they are expected to grow, and
/// at exactly their length otherwise. Inserting into a full segment splits it; removing from a
/// segment shrinks it in place and then merges it with a neighbour if both fit into one block.
///
/// The range map is a type parameter. [`AvlRangeMap`][crate::AvlRangeMap] is the default and the
/// right choice for large lists; [`VecRangeMap`][crate::VecRangeMap] is cheaper for lists that
/// stay within a few dozen segments.
///
/// ```
/// # use hugelist::HugeList;
/// let mut v: HugeList<i32> = HugeList::with_block_size(4);
/// v.insert_range(0, 1..=9).unwrap();
/// v.remove_range(2, 3).unwrap();
/// assert_eq!(v.to_vec(), vec![1, 2, 6, 7, 8, 9]);
/// assert!(v.validate().is_ok());
/// ```
pub struct HugeList<T, M = AvlRangeMap<Block<T>>> {
    map: M,
    max_block_size: NonZeroUsize,
    // start of the only segment whose capacity exceeds its length
    slack: Option<usize>,
    version: u64,
    _items: PhantomData<T>,
}

impl<T> HugeList<T> {
    /// Create a new, empty [`HugeList`][crate::HugeList] with the default block size of 512.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let v: HugeList<i32> = HugeList::new();
    /// assert_eq!(v.len(), 0);
    /// assert_eq!(v.max_block_size(), 512);
    /// ```
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    /// Create a new, empty [`HugeList`][crate::HugeList] whose segments hold at most
    /// `max_block_size` elements.
    ///
    /// # Panics
    /// - If `max_block_size` is zero
    pub fn with_block_size(max_block_size: usize) -> Self {
        let max_block_size = NonZeroUsize::new(max_block_size).expect("non-zero block size");
        Self::from_parts(AvlRangeMap::new(), max_block_size)
    }

    /// Like [`with_block_size`][crate::HugeList::with_block_size], but reports a zero block size
    /// as an error.
    pub fn try_with_block_size(max_block_size: usize) -> Result<Self> {
        Self::with_map(AvlRangeMap::new(), max_block_size)
    }
}

impl<T, M: RangeMap<Block<T>>> HugeList<T, M> {
    /// Create a new, empty [`HugeList`][crate::HugeList] on top of the given range map.
    ///
    /// ```
    /// # use hugelist::{HugeList, VecRangeMap};
    /// let mut v = HugeList::with_map(VecRangeMap::new(), 16).unwrap();
    /// v.push(1);
    /// assert_eq!(v[0], 1);
    /// ```
    pub fn with_map(map: M, max_block_size: usize) -> Result<Self> {
        let caller = "HugeList::with_map";
        let max_block_size = NonZeroUsize::new(max_block_size).ok_or(
            HugeListError::InvalidArgument {
                caller,
                reason: "block size must be non-zero",
            },
        )?;
        if !map.is_empty() {
            return Err(HugeListError::InvalidArgument {
                caller,
                reason: "range map must be empty",
            });
        }
        Ok(Self::from_parts(map, max_block_size))
    }

    fn from_parts(map: M, max_block_size: NonZeroUsize) -> Self {
        HugeList {
            map,
            max_block_size,
            slack: None,
            version: 0,
            _items: PhantomData,
        }
    }

    /// The number of elements in the [`HugeList`][crate::HugeList].
    #[inline]
    pub fn len(&self) -> usize {
        self.map.extent()
    }

    /// Returns `true` if the [`HugeList`][crate::HugeList] holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The maximum number of elements a single segment holds.
    #[inline]
    pub fn max_block_size(&self) -> usize {
        self.max_block_size.get()
    }

    /// Structural modification counter. Grows by one with every call that inserts or removes
    /// elements; in-place writes leave it alone.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The number of segments currently in use.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.map.len()
    }

    /// Always `false`; kept for parity with list interfaces that can be frozen.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        false
    }

    /// Returns a reference to the element at the given index, if it exists.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = HugeList::new();
    /// assert_eq!(v.get(0), None);
    /// v.push(1);
    /// assert_eq!(*v.get(0).unwrap(), 1);
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        let entry = self.map.nearest_less_or_equal(index)?;
        entry.value.as_slice().get(index - entry.start)
    }

    /// Returns a mutable reference to the element at the given index, if it exists.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        let start = self.map.nearest_less_or_equal(index)?.start;
        let (_, block) = self.map.get_mut(start)?;
        block.as_mut_slice().get_mut(index - start)
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, val: T) -> Result<T> {
        let len = self.len();
        match self.get_mut(index) {
            Some(slot) => Ok(mem::replace(slot, val)),
            None => Err(HugeListError::OutOfBounds {
                caller: "HugeList::set",
                index,
                len,
            }),
        }
    }

    /// The first element, or `None` if the list is empty.
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// The last element, or `None` if the list is empty.
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Appends a value to the end of the [`HugeList`][crate::HugeList].
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = HugeList::new();
    /// v.push(1);
    /// assert_eq!(v[0], 1);
    /// ```
    ///
    /// # Panics
    /// - If the length overflows `usize`
    pub fn push(&mut self, val: T) {
        if self.try_push(val).is_err() {
            capacity_overflow()
        }
    }

    /// Appends a value, reporting a length overflow as an error.
    pub fn try_push(&mut self, val: T) -> Result<()> {
        let len = self.len();
        self.insert(len, val)
    }

    /// Inserts a value at `index`, shifting everything after it.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = HugeList::new();
    /// v.push(1);
    /// v.push(2);
    /// v.insert(0, 100).unwrap();
    /// assert_eq!(v[0], 100);
    /// assert!(v.insert(4, 5).is_err());
    /// ```
    pub fn insert(&mut self, index: usize, val: T) -> Result<()> {
        self.insert_exact("HugeList::insert", index, 1, std::iter::once(val))
    }

    /// Inserts all items of `items` at `index`, in order.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = HugeList::with_block_size(2);
    /// v.insert_range(0, [1, 4]).unwrap();
    /// v.insert_range(1, [2, 3]).unwrap();
    /// assert_eq!(v.to_vec(), vec![1, 2, 3, 4]);
    /// ```
    pub fn insert_range<I>(&mut self, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Storage<T> = items.into_iter().collect();
        let count = items.len();
        self.insert_exact("HugeList::insert_range", index, count, items.into_iter())
    }

    /// Inserts clones of `source[offset..offset + count]` at `index`.
    pub fn insert_slice(
        &mut self,
        index: usize,
        source: &[T],
        offset: usize,
        count: usize,
    ) -> Result<()>
    where
        T: Clone,
    {
        let caller = "HugeList::insert_slice";
        let end = check_range(caller, offset, count, source.len())?;
        self.check_insert(caller, index, count)?;
        let items: Storage<T> = source[offset..end].iter().cloned().collect();
        self.insert_exact(caller, index, count, items.into_iter())
    }

    /// Inserts `count` default values at `index`.
    pub fn insert_default(&mut self, index: usize, count: usize) -> Result<()>
    where
        T: Default,
    {
        let caller = "HugeList::insert_default";
        self.check_insert(caller, index, count)?;
        let items: Storage<T> = std::iter::repeat_with(T::default).take(count).collect();
        self.insert_exact(caller, index, count, items.into_iter())
    }

    /// Appends all items of `items`.
    pub fn add_range<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let len = self.len();
        self.insert_range(len, items)
    }

    /// Removes and returns the element at `index`.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = HugeList::new();
    /// v.push(1);
    /// v.push(2);
    /// assert_eq!(v.remove_at(1).unwrap(), 2);
    /// assert_eq!(v.len(), 1);
    /// ```
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let len = self.len();
        if index >= len {
            return Err(HugeListError::OutOfBounds {
                caller: "HugeList::remove_at",
                index,
                len,
            });
        }
        let mut removed = None;
        self.remove_exact(index, 1, &mut |v| removed = Some(v));
        match removed {
            Some(v) => Ok(v),
            None => unreachable!("removed element was not handed out"),
        }
    }

    /// Removes `count` elements starting at `index`.
    pub fn remove_range(&mut self, index: usize, count: usize) -> Result<()> {
        check_range("HugeList::remove_range", index, count, self.len())?;
        self.remove_exact(index, count, &mut drop);
        Ok(())
    }

    /// Removes `count` elements starting at `index` and returns them in order.
    pub fn drain_range(&mut self, index: usize, count: usize) -> Result<Vec<T>> {
        check_range("HugeList::drain_range", index, count, self.len())?;
        let mut drained = Vec::with_capacity(count);
        self.remove_exact(index, count, &mut |v| drained.push(v));
        Ok(drained)
    }

    /// Removes the first element equal to `val`. Returns `true` if one was found.
    pub fn remove_item(&mut self, val: &T) -> bool
    where
        T: PartialEq,
    {
        match self.index_of(val) {
            Some(index) => {
                self.remove_exact(index, 1, &mut drop);
                true
            }
            None => false,
        }
    }

    /// Removes the last element and returns it, or `None` if the list is empty.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.len().checked_sub(1)?;
        self.remove_at(last).ok()
    }

    /// Shortens the list to `len` elements. No-op if it is already shorter.
    pub fn truncate(&mut self, len: usize) {
        let size = self.len();
        if len < size {
            self.remove_exact(len, size - len, &mut drop);
        }
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.map.clear();
        self.slack = None;
        self.version += 1;
    }

    /// Returns an iterator over immutable references to the elements.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let v: HugeList<i32> = (1..=3).collect();
    /// let mut i = v.iter();
    /// assert_eq!(*i.next().unwrap(), 1);
    /// assert_eq!(*i.next_back().unwrap(), 3);
    /// assert_eq!(*i.next().unwrap(), 2);
    /// assert_eq!(i.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T, M> {
        let len = self.len();
        Iter {
            front: self.chunks_in_unchecked(0, len),
            back: self.chunks_rev_in_unchecked(0, len),
            front_items: [].iter(),
            back_items: [].iter(),
            size: len,
        }
    }

    /// Copies the whole list into a [`Vec`][std::vec::Vec].
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        for chunk in self.chunks() {
            out.extend_from_slice(chunk.items);
        }
        out
    }
}

impl<T, M: RangeMap<Block<T>> + Default> Default for HugeList<T, M> {
    fn default() -> Self {
        let max_block_size = match NonZeroUsize::new(DEFAULT_BLOCK_SIZE) {
            Some(size) => size,
            None => unreachable!(),
        };
        Self::from_parts(M::default(), max_block_size)
    }
}

impl<T: Clone, M: RangeMap<Block<T>> + Clone> Clone for HugeList<T, M> {
    fn clone(&self) -> Self {
        HugeList {
            map: self.map.clone(),
            max_block_size: self.max_block_size,
            slack: self.slack,
            version: 0,
            _items: PhantomData,
        }
    }
}

impl<T, M: RangeMap<Block<T>>> Index<usize> for HugeList<T, M> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(t) => t,
            None => index_oob("HugeList::index", index, self.len()),
        }
    }
}

impl<T, M: RangeMap<Block<T>>> IndexMut<usize> for HugeList<T, M> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let size = self.len();
        match self.get_mut(index) {
            Some(t) => t,
            None => index_oob("HugeList::index_mut", index, size),
        }
    }
}

impl<T: Debug, M: RangeMap<Block<T>>> Debug for HugeList<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Hash, M: RangeMap<Block<T>>> Hash for HugeList<T, M> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        self.iter().for_each(|i| i.hash(state));
    }
}

impl<T, M, N> PartialEq<HugeList<T, N>> for HugeList<T, M>
where
    T: PartialEq,
    M: RangeMap<Block<T>>,
    N: RangeMap<Block<T>>,
{
    fn eq(&self, other: &HugeList<T, N>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, M: RangeMap<Block<T>>> Eq for HugeList<T, M> {}

impl<T, M: RangeMap<Block<T>>> Extend<T> for HugeList<T, M> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if self.add_range(iter).is_err() {
            capacity_overflow()
        }
    }
}

impl<T, M: RangeMap<Block<T>> + Default> FromIterator<T> for HugeList<T, M> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Self::default();
        v.extend(iter);
        v
    }
}

impl<T, M: RangeMap<Block<T>>> IntoIterator for HugeList<T, M> {
    type IntoIter = IntoIter<T, M>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            size: self.len(),
            map: self.map,
            front: Storage::new().into_iter(),
            back: Storage::new().into_iter(),
        }
    }
}

impl<'a, T, M: RangeMap<Block<T>>> IntoIterator for &'a HugeList<T, M> {
    type IntoIter = Iter<'a, T, M>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over immutable references to items in a [`HugeList`][crate::HugeList].
pub struct Iter<'a, T: 'a, M: RangeMap<Block<T>> + 'a> {
    front: Chunks<'a, T, M>,
    back: ChunksRev<'a, T, M>,
    front_items: std::slice::Iter<'a, T>,
    back_items: std::slice::Iter<'a, T>,
    // front and back walk the same segments; this keeps them from crossing
    size: usize,
}

impl<'a, T: 'a, M: RangeMap<Block<T>> + 'a> Iterator for Iter<'a, T, M> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.size == 0 {
            return None;
        }
        loop {
            if let Some(i) = self.front_items.next() {
                self.size -= 1;
                return Some(i);
            }
            self.front_items = self.front.next()?.items.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.size, Some(self.size))
    }
}

impl<'a, T: 'a, M: RangeMap<Block<T>> + 'a> DoubleEndedIterator for Iter<'a, T, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.size == 0 {
            return None;
        }
        loop {
            if let Some(i) = self.back_items.next_back() {
                self.size -= 1;
                return Some(i);
            }
            self.back_items = self.back.next()?.items.iter();
        }
    }
}

impl<'a, T: 'a, M: RangeMap<Block<T>> + 'a> FusedIterator for Iter<'a, T, M> {}
impl<'a, T: 'a, M: RangeMap<Block<T>> + 'a> ExactSizeIterator for Iter<'a, T, M> {}

/// Consuming iterator over items in a [`HugeList`][crate::HugeList].
///
/// Segments are detached from the map one at a time as the iterator reaches them.
pub struct IntoIter<T, M> {
    map: M,
    front: <Storage<T> as IntoIterator>::IntoIter,
    back: <Storage<T> as IntoIterator>::IntoIter,
    size: usize,
}

impl<T, M: RangeMap<Block<T>>> Iterator for IntoIter<T, M> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(i) = self.front.next() {
                self.size -= 1;
                return Some(i);
            }
            match self.map.remove(0) {
                Some((_, block)) => self.front = block.into_storage().into_iter(),
                None => break,
            }
        }
        // the map is exhausted; whatever is left sits in the back segment
        let i = self.back.next()?;
        self.size -= 1;
        Some(i)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.size, Some(self.size))
    }
}

impl<T, M: RangeMap<Block<T>>> DoubleEndedIterator for IntoIter<T, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(i) = self.back.next_back() {
                self.size -= 1;
                return Some(i);
            }
            let last = match self.map.nearest_less_or_equal(usize::MAX) {
                Some(entry) => entry.start,
                None => break,
            };
            match self.map.remove(last) {
                Some((_, block)) => self.back = block.into_storage().into_iter(),
                None => break,
            }
        }
        let i = self.front.next_back()?;
        self.size -= 1;
        Some(i)
    }
}

impl<T, M: RangeMap<Block<T>>> FusedIterator for IntoIter<T, M> {}
impl<T, M: RangeMap<Block<T>>> ExactSizeIterator for IntoIter<T, M> {}

#[cold]
fn capacity_overflow() -> ! {
    panic!("HugeList: capacity overflow")
}

#[cold]
fn index_oob(caller: &str, idx: usize, len: usize) -> ! {
    panic!(
        "{}: index out of bounds: index is {}, len is {}",
        caller, idx, len
    )
}
