use log::debug;

use crate::block::Block;
use crate::error::{HugeListError, Result};
use crate::range_map::RangeMap;
use crate::HugeList;

impl<T, M: RangeMap<Block<T>>> HugeList<T, M> {
    /// Checks the segment layout: lengths, capacities, the slack record and that no two
    /// neighbouring segments fit into one block. Only reads; never changes the layout.
    ///
    /// On failure the error carries the output of [`dump`][HugeList::dump].
    pub fn validate(&self) -> Result<()> {
        match self.find_violation() {
            None => Ok(()),
            Some(reason) => {
                let dump = self.dump();
                debug!("invalid segment layout: {}\n{}", reason, dump);
                Err(HugeListError::InvariantViolation { reason, dump })
            }
        }
    }

    fn find_violation(&self) -> Option<String> {
        let max = self.max_block_size();
        let mut expected = 0;
        let mut prev_len: Option<usize> = None;
        let mut slack_seen = None;

        for entry in self.map.entries_from(0) {
            let block = entry.value;
            if entry.start != expected {
                return Some(format!(
                    "segment at {} should start at {}",
                    entry.start, expected
                ));
            }
            if entry.length != block.len() {
                return Some(format!(
                    "segment at {} has length {} but holds {} items",
                    entry.start,
                    entry.length,
                    block.len()
                ));
            }
            if block.is_empty() {
                return Some(format!("segment at {} is empty", entry.start));
            }
            if block.len() > max || block.capacity() > max {
                return Some(format!(
                    "segment at {} (length {}, capacity {}) exceeds the block size {}",
                    entry.start,
                    block.len(),
                    block.capacity(),
                    max
                ));
            }
            if block.has_slack() {
                if self.slack != Some(entry.start) {
                    return Some(format!(
                        "segment at {} has unrecorded spare capacity",
                        entry.start
                    ));
                }
                slack_seen = Some(entry.start);
            }
            if let Some(prev_len) = prev_len {
                if prev_len + entry.length <= max {
                    return Some(format!(
                        "segments meeting at {} fit into one block ({} + {} <= {})",
                        entry.start, prev_len, entry.length, max
                    ));
                }
            }
            prev_len = Some(entry.length);
            expected = entry.end();
        }

        if expected != self.map.extent() {
            return Some(format!(
                "segments cover {} items but the extent is {}",
                expected,
                self.map.extent()
            ));
        }
        match self.slack {
            Some(start) if slack_seen != Some(start) => Some(format!(
                "recorded slack segment at {} has no spare capacity",
                start
            )),
            _ => None,
        }
    }

    /// One header line, then one line per segment with its start, length and capacity. The
    /// slack segment is marked with `*`.
    ///
    /// ```
    /// # use hugelist::HugeList;
    /// let mut v: HugeList<i32> = HugeList::with_block_size(4);
    /// v.add_range(0..6).unwrap();
    /// assert_eq!(
    ///     v.dump(),
    ///     "len=6 segments=2 max_block_size=4\n\
    ///      start=0 length=4 capacity=4\n\
    ///      start=4 length=2 capacity=4 *\n"
    /// );
    /// ```
    pub fn dump(&self) -> String {
        let mut out = format!(
            "len={} segments={} max_block_size={}\n",
            self.len(),
            self.segment_count(),
            self.max_block_size()
        );
        for entry in self.map.entries_from(0) {
            let marker = if self.slack == Some(entry.start) { " *" } else { "" };
            out.push_str(&format!(
                "start={} length={} capacity={}{}\n",
                entry.start,
                entry.length,
                entry.value.capacity(),
                marker
            ));
        }
        out
    }
}
