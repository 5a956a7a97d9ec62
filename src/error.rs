use thiserror::Error;

/// Errors reported by fallible [`HugeList`][crate::HugeList] operations.
///
/// Every operation validates its arguments before touching the structure, so a returned error
/// means the list is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HugeListError {
    /// An argument was rejected before any bounds were considered.
    #[error("{caller}: invalid argument: {reason}")]
    InvalidArgument {
        caller: &'static str,
        reason: &'static str,
    },

    /// An index or `index + count` reaches past the end of the list or of an external buffer.
    #[error("{caller}: index out of bounds: index is {index}, len is {len}")]
    OutOfBounds {
        caller: &'static str,
        index: usize,
        len: usize,
    },

    /// A computed position does not fit into `usize`.
    #[error("{caller}: arithmetic overflow")]
    Overflow { caller: &'static str },

    /// The list changed structurally while a strict [`Cursor`][crate::Cursor] was walking it.
    #[error("collection was modified; version {expected} expected, found {found}")]
    ConcurrentModification { expected: u64, found: u64 },

    /// Raised by [`HugeList::validate`][crate::HugeList::validate] only.
    #[error("structural invariant violated: {reason}\n{dump}")]
    InvariantViolation { reason: String, dump: String },
}

pub type Result<T> = std::result::Result<T, HugeListError>;

/// Checks that `[index, index + count)` lies within `[0, len)`.
pub(crate) fn check_range(
    caller: &'static str,
    index: usize,
    count: usize,
    len: usize,
) -> Result<usize> {
    let end = index
        .checked_add(count)
        .ok_or(HugeListError::Overflow { caller })?;
    if index > len {
        return Err(HugeListError::OutOfBounds { caller, index, len });
    }
    if end > len {
        return Err(HugeListError::OutOfBounds {
            caller,
            index: end,
            len,
        });
    }
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks() {
        assert_eq!(check_range("t", 0, 0, 0), Ok(0));
        assert_eq!(check_range("t", 2, 3, 5), Ok(5));
        assert_eq!(
            check_range("t", 6, 0, 5),
            Err(HugeListError::OutOfBounds {
                caller: "t",
                index: 6,
                len: 5
            })
        );
        assert_eq!(
            check_range("t", 3, 3, 5),
            Err(HugeListError::OutOfBounds {
                caller: "t",
                index: 6,
                len: 5
            })
        );
        assert_eq!(
            check_range("t", usize::MAX, 1, 5),
            Err(HugeListError::Overflow { caller: "t" })
        );
    }

    #[test]
    fn messages() {
        let e = HugeListError::OutOfBounds {
            caller: "HugeList::remove_range",
            index: 9,
            len: 4,
        };
        assert_eq!(
            e.to_string(),
            "HugeList::remove_range: index out of bounds: index is 9, len is 4"
        );
    }
}
