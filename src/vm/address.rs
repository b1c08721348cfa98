//! Segmented memory addresses and checked offset arithmetic

use std::fmt;

/// Add a signed 16-bit displacement to an unsigned base offset.
///
/// Returns `None` instead of wrapping when the result leaves the `u64` range.
pub fn safe_offset(base: u64, offset: i16) -> Option<u64> {
    base.checked_add_signed(i64::from(offset))
}

/// A location in VM memory: a segment and an offset inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryAddress {
    /// Index of the memory segment
    pub segment_index: u64,
    /// Offset of the cell within the segment
    pub offset: u64,
}

impl MemoryAddress {
    /// Creates an address from a segment index and an offset
    pub fn new(segment_index: u64, offset: u64) -> Self {
        MemoryAddress {
            segment_index,
            offset,
        }
    }

    /// Displace the address within its segment, or `None` on overflow
    pub fn add_offset(&self, offset: i16) -> Option<Self> {
        safe_offset(self.offset, offset).map(|offset| MemoryAddress {
            segment_index: self.segment_index,
            offset,
        })
    }
}

impl fmt::Display for MemoryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment_index, self.offset)
    }
}
