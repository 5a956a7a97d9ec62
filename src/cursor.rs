use crate::block::Block;
use crate::error::{HugeListError, Result};
use crate::iterate::Chunk;
use crate::range_map::RangeMap;
use crate::HugeList;

/// How a [`Cursor`] reacts when the list it walks was structurally modified between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    /// Fail with [`HugeListError::ConcurrentModification`].
    #[default]
    Strict,
    /// Keep going from the same logical index. Elements may be skipped or seen twice.
    Robust,
}

/// A detached position in a [`HugeList`][crate::HugeList].
///
/// Unlike [`Iter`][crate::Iter], a cursor does not borrow the list between steps, so the list
/// may be modified while the walk is paused. The cursor remembers the list's
/// [`version`][crate::HugeList::version] and checks it on every step.
///
/// ```
/// # use hugelist::{CursorMode, HugeList, HugeListError};
/// let mut v: HugeList<i32> = (0..4).collect();
/// let mut c = v.cursor(CursorMode::Strict);
/// assert_eq!(c.next(&v).unwrap(), Some(&0));
/// v.push(4);
/// assert!(matches!(c.next(&v), Err(HugeListError::ConcurrentModification { .. })));
/// c.reset(&v);
/// assert_eq!(c.next(&v).unwrap(), Some(&0));
/// ```
#[derive(Debug, Clone)]
pub struct Cursor {
    index: usize,
    version: u64,
    mode: CursorMode,
}

impl Cursor {
    pub fn new<T, M: RangeMap<Block<T>>>(list: &HugeList<T, M>, mode: CursorMode) -> Self {
        Cursor {
            index: 0,
            version: list.version(),
            mode,
        }
    }

    /// Index of the element the next step yields.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    /// Moves back to the first element and adopts the list's current version.
    pub fn reset<T, M: RangeMap<Block<T>>>(&mut self, list: &HugeList<T, M>) {
        self.index = 0;
        self.version = list.version();
    }

    fn check<T, M: RangeMap<Block<T>>>(&mut self, list: &HugeList<T, M>) -> Result<()> {
        let found = list.version();
        if found != self.version {
            match self.mode {
                CursorMode::Strict => {
                    return Err(HugeListError::ConcurrentModification {
                        expected: self.version,
                        found,
                    })
                }
                CursorMode::Robust => self.version = found,
            }
        }
        Ok(())
    }

    /// Yields the next element, or `None` at the end of the list.
    pub fn next<'a, T, M: RangeMap<Block<T>>>(
        &mut self,
        list: &'a HugeList<T, M>,
    ) -> Result<Option<&'a T>> {
        self.check(list)?;
        let item = list.get(self.index);
        if item.is_some() {
            self.index += 1;
        }
        Ok(item)
    }

    /// Yields the rest of the current segment in one piece.
    pub fn next_chunk<'a, T, M: RangeMap<Block<T>>>(
        &mut self,
        list: &'a HugeList<T, M>,
    ) -> Result<Option<Chunk<'a, T>>> {
        self.check(list)?;
        let len = list.len();
        if self.index >= len {
            return Ok(None);
        }
        let chunk = list.chunks_in_unchecked(self.index, len - self.index).next();
        if let Some(chunk) = &chunk {
            self.index = chunk.end();
        }
        Ok(chunk)
    }
}

impl<T, M: RangeMap<Block<T>>> HugeList<T, M> {
    /// Creates a [`Cursor`] positioned at the first element.
    pub fn cursor(&self, mode: CursorMode) -> Cursor {
        Cursor::new(self, mode)
    }
}
