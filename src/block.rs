use std::fmt::Debug;
use std::ops::{Index, IndexMut, Range};

pub(crate) mod inner {
    #[cfg(feature = "thin-segments")]
    pub type Storage<T> = thin_vec::ThinVec<T>;
    #[cfg(not(feature = "thin-segments"))]
    pub type Storage<T> = Vec<T>;
}

use inner::Storage;

/// The backing buffer of one segment.
///
/// The logical `capacity` is tracked separately from whatever the allocator handed out, so the
/// "at most one segment with slack" rule can be checked exactly, including for zero-sized `T`.
pub struct Block<T> {
    items: Storage<T>,
    capacity: usize,
}

impl<T> Block<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Block {
            items: Storage::with_capacity(capacity),
            capacity,
        }
    }

    /// Wraps already filled storage; the capacity is the exact length.
    pub fn from_storage(items: Storage<T>) -> Self {
        let capacity = items.len();
        Block { items, capacity }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items that can still be stored without growing.
    #[inline]
    pub fn room(&self) -> usize {
        self.capacity - self.items.len()
    }

    #[inline]
    pub fn has_slack(&self) -> bool {
        self.capacity > self.items.len()
    }

    /// Grows the capacity to `capacity`. Never shrinks.
    pub fn reserve_to(&mut self, capacity: usize) {
        if capacity > self.capacity {
            let len = self.items.len();
            self.items.reserve_exact(capacity - len);
            self.capacity = capacity;
        }
    }

    /// Drops the unused capacity. Returns `true` if there was any.
    pub fn trim(&mut self) -> bool {
        if self.has_slack() {
            self.items.shrink_to_fit();
            self.capacity = self.items.len();
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn push(&mut self, val: T) {
        debug_assert!(self.items.len() < self.capacity, "block overflow");
        self.items.push(val);
    }

    /// Moves `count` items from `source` to the end of the block.
    pub fn fill_from<I>(&mut self, source: &mut I, count: usize)
    where
        I: Iterator<Item = T>,
    {
        debug_assert!(count <= self.room(), "block overflow");
        self.items.extend(source.take(count));
    }

    /// Moves `count` items from `source` to the front of the block.
    pub fn prepend_from<I>(&mut self, source: &mut I, count: usize)
    where
        I: Iterator<Item = T>,
    {
        debug_assert!(count <= self.room(), "block overflow");
        let before = self.items.len();
        self.items.extend(source.take(count));
        let added = self.items.len() - before;
        self.items.rotate_right(added);
    }

    /// Appends all items of `other`, leaving it empty.
    pub fn append(&mut self, other: &mut Block<T>) {
        debug_assert!(other.len() <= self.room(), "block overflow");
        self.items.append(&mut other.items);
    }

    /// Splits off the items at and after `at`. The capacity of `self` is unchanged.
    pub fn split_off(&mut self, at: usize) -> Storage<T> {
        self.items.split_off(at)
    }

    /// Removes the items in `range`, shifting the survivors down, and hands each removed item
    /// to `sink` in order.
    pub fn drain_into<F>(&mut self, range: Range<usize>, sink: &mut F)
    where
        F: FnMut(T),
    {
        self.items.drain(range).for_each(sink);
    }

    /// Keeps the items matching `f`, in order. `f` sees every item before any of them moves, so a
    /// panic in `f` leaves the block untouched.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        let keep: Vec<bool> = self.items.iter().map(|v| f(v)).collect();
        let mut keep = keep.into_iter();
        self.items.retain(|_| keep.next().unwrap_or(true));
    }

    pub fn into_storage(self) -> Storage<T> {
        self.items
    }
}

impl<T: Clone> Clone for Block<T> {
    fn clone(&self) -> Self {
        let mut items = Storage::with_capacity(self.capacity);
        items.extend(self.items.iter().cloned());
        Block {
            items,
            capacity: self.capacity,
        }
    }
}

impl<T: Debug> Debug for Block<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("capacity", &self.capacity)
            .field("items", &self.as_slice())
            .finish()
    }
}

impl<T> Index<usize> for Block<T> {
    type Output = T;
    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for Block<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.items[index]
    }
}
