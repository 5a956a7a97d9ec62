use std::cmp::Ordering;

use either::Either;

use crate::block::Block;
use crate::error::{check_range, Result};
use crate::range_map::RangeMap;
use crate::HugeList;

/// Which match [`binary_search_range`][crate::HugeList::binary_search_range] reports when the
/// searched value equals several elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Duplicates {
    /// Whichever equal element the bisection lands on.
    #[default]
    Any,
    /// The first of the run of equal elements.
    First,
}

impl<T, M: RangeMap<Block<T>>> HugeList<T, M> {
    // segment-wise linear scan of `[index, index + count)`
    fn scan<P>(&self, index: usize, count: usize, backward: bool, mut pred: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        let chunks = if backward {
            Either::Right(self.chunks_rev_in_unchecked(index, count))
        } else {
            Either::Left(self.chunks_in_unchecked(index, count))
        };
        for chunk in chunks {
            let hit = if backward {
                chunk.items.iter().rposition(&mut pred)
            } else {
                chunk.items.iter().position(&mut pred)
            };
            if let Some(offset) = hit {
                return Some(chunk.start + offset);
            }
        }
        None
    }

    /// Index of the first element equal to `val`.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let v: HugeList<i32> = [1, 2, 3, 2].into_iter().collect();
    /// assert_eq!(v.index_of(&2), Some(1));
    /// assert_eq!(v.last_index_of(&2), Some(3));
    /// assert_eq!(v.index_of(&7), None);
    /// ```
    pub fn index_of(&self, val: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.scan(0, self.len(), false, |v| v == val)
    }

    /// Index of the first element equal to `val` within `[index, index + count)`.
    pub fn index_of_range(&self, val: &T, index: usize, count: usize) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        check_range("HugeList::index_of_range", index, count, self.len())?;
        Ok(self.scan(index, count, false, |v| v == val))
    }

    /// Index of the last element equal to `val`.
    pub fn last_index_of(&self, val: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.scan(0, self.len(), true, |v| v == val)
    }

    /// Index of the last element equal to `val` within `[index, index + count)`.
    pub fn last_index_of_range(&self, val: &T, index: usize, count: usize) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        check_range("HugeList::last_index_of_range", index, count, self.len())?;
        Ok(self.scan(index, count, true, |v| v == val))
    }

    /// Index of the first element within `[index, index + count)` equal to any of `vals`.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let v: HugeList<char> = "hugelist".chars().collect();
    /// assert_eq!(v.index_of_any(&['l', 's'], 0, 8).unwrap(), Some(4));
    /// assert_eq!(v.last_index_of_any(&['l', 's'], 0, 8).unwrap(), Some(6));
    /// ```
    pub fn index_of_any(&self, vals: &[T], index: usize, count: usize) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        check_range("HugeList::index_of_any", index, count, self.len())?;
        Ok(self.scan(index, count, false, |v| vals.contains(v)))
    }

    /// Index of the last element within `[index, index + count)` equal to any of `vals`.
    pub fn last_index_of_any(&self, vals: &[T], index: usize, count: usize) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        check_range("HugeList::last_index_of_any", index, count, self.len())?;
        Ok(self.scan(index, count, true, |v| vals.contains(v)))
    }

    /// Index of the first element matching `pred`.
    pub fn find_index<P>(&self, pred: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.scan(0, self.len(), false, pred)
    }

    /// Index of the first element within `[index, index + count)` matching `pred`.
    pub fn find_index_range<P>(&self, index: usize, count: usize, pred: P) -> Result<Option<usize>>
    where
        P: FnMut(&T) -> bool,
    {
        check_range("HugeList::find_index_range", index, count, self.len())?;
        Ok(self.scan(index, count, false, pred))
    }

    /// Index of the last element matching `pred`.
    pub fn find_last_index<P>(&self, pred: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.scan(0, self.len(), true, pred)
    }

    pub fn find_last_index_range<P>(
        &self,
        index: usize,
        count: usize,
        pred: P,
    ) -> Result<Option<usize>>
    where
        P: FnMut(&T) -> bool,
    {
        check_range("HugeList::find_last_index_range", index, count, self.len())?;
        Ok(self.scan(index, count, true, pred))
    }

    /// Binary searches a sorted list for `val`, with the contract of
    /// [`slice::binary_search`][std::primitive::slice::binary_search].
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let v: HugeList<i32> = (0..100).map(|x| x * 2).collect();
    /// assert_eq!(v.binary_search(&40), Ok(20));
    /// assert_eq!(v.binary_search(&41), Err(21));
    /// ```
    pub fn binary_search(&self, val: &T) -> std::result::Result<usize, usize>
    where
        T: Ord,
    {
        self.binary_search_by(|v| v.cmp(val))
    }

    /// Binary searches the whole list with a comparator, like [`slice::binary_search_by`].
    pub fn binary_search_by<F>(&self, f: F) -> std::result::Result<usize, usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.bisect(0, self.len(), f, Duplicates::Any)
    }

    /// Binary searches the whole list by the key `f` extracts from each element.
    pub fn binary_search_by_key<B, F>(&self, key: &B, mut f: F) -> std::result::Result<usize, usize>
    where
        B: Ord,
        F: FnMut(&T) -> B,
    {
        self.binary_search_by(|v| f(v).cmp(key))
    }

    /// Binary searches `[index, index + count)`. With [`Duplicates::First`] a match is moved back
    /// to the first of its run of equal elements.
    ///
    /// ```
    /// # use hugelist::{Duplicates, HugeList};
    /// let v: HugeList<i32> = [1, 2, 2, 2, 2, 3].into_iter().collect();
    /// let found = v.binary_search_range(0, 6, |x| x.cmp(&2), Duplicates::First).unwrap();
    /// assert_eq!(found, Ok(1));
    /// ```
    pub fn binary_search_range<F>(
        &self,
        index: usize,
        count: usize,
        f: F,
        duplicates: Duplicates,
    ) -> Result<std::result::Result<usize, usize>>
    where
        F: FnMut(&T) -> Ordering,
    {
        check_range("HugeList::binary_search_range", index, count, self.len())?;
        Ok(self.bisect(index, count, f, duplicates))
    }

    fn bisect<F>(
        &self,
        index: usize,
        count: usize,
        mut f: F,
        duplicates: Duplicates,
    ) -> std::result::Result<usize, usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut lo = index;
        let mut hi = index + count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match f(&self[mid]) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => {
                    let mut first = mid;
                    if duplicates == Duplicates::First {
                        while first > index && f(&self[first - 1]) == Ordering::Equal {
                            first -= 1;
                        }
                    }
                    return Ok(first);
                }
            }
        }
        Err(lo)
    }
}
