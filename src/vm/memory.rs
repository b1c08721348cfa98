//! Segmented, write-once VM memory

use thiserror::Error;

use super::address::MemoryAddress;
use super::felt::Felt;
use super::value::MemoryValue;

/// Errors raised by memory accesses and tagged arithmetic
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// Read of a cell that was never written
    #[error("Uninitialized memory cell at {0}")]
    UninitializedCell(MemoryAddress),

    /// Access to a segment that was never allocated
    #[error("Unknown segment {segment_index}")]
    UnknownSegment {
        /// Requested segment index
        segment_index: u64,
    },

    /// Cell offset too large for the host to index
    #[error("Offset of {0} does not fit in host memory")]
    UnaddressableOffset(MemoryAddress),

    /// Second write of a different value to a write-once cell
    #[error("Rewriting cell {address}: old value {old}, new value {new}")]
    Overwrite {
        /// Cell being written
        address: MemoryAddress,
        /// Value already present
        old: MemoryValue,
        /// Value that was rejected
        new: MemoryValue,
    },

    /// Ill-typed arithmetic on tagged values
    #[error("Invalid operation: {op} on {lhs} ({lhs_kind}) and {rhs} ({rhs_kind})")]
    InvalidOperation {
        /// Operator symbol
        op: String,
        /// Left operand
        lhs: MemoryValue,
        /// Left operand tag
        lhs_kind: &'static str,
        /// Right operand
        rhs: MemoryValue,
        /// Right operand tag
        rhs_kind: &'static str,
    },

    /// Pointer arithmetic leaving the segment's offset range
    #[error("Address overflow: {address} + {delta}")]
    AddressOverflow {
        /// Base address
        address: MemoryAddress,
        /// Field element added to it
        delta: Felt,
    },
}

impl MemoryError {
    /// Build an `InvalidOperation` error from the offending operands
    pub fn invalid_operation(op: &str, lhs: &MemoryValue, rhs: &MemoryValue) -> Self {
        MemoryError::InvalidOperation {
            op: op.to_string(),
            lhs: *lhs,
            lhs_kind: lhs.kind_name(),
            rhs: *rhs,
            rhs_kind: rhs.kind_name(),
        }
    }
}

/// A contiguous run of cells; unset cells are `None`
#[derive(Debug, Clone, Default)]
pub struct Segment {
    data: Vec<Option<MemoryValue>>,
}

impl Segment {
    /// Number of cells up to and including the highest written one
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if no cell has been written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn get(&self, offset: u64) -> Option<&MemoryValue> {
        usize::try_from(offset)
            .ok()
            .and_then(|idx| self.data.get(idx))
            .and_then(Option::as_ref)
    }
}

/// VM memory made of independently growing segments
#[derive(Debug, Clone)]
pub struct Memory {
    segments: Vec<Segment>,
}

impl Memory {
    /// Creates memory with the program and execution segments allocated
    pub fn new() -> Self {
        Memory {
            segments: vec![Segment::default(), Segment::default()],
        }
    }

    /// Allocate a fresh segment and return its index
    pub fn allocate_segment(&mut self) -> u64 {
        self.segments.push(Segment::default());
        (self.segments.len() - 1) as u64
    }

    /// Number of allocated segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Length of a segment, or `None` if it does not exist
    pub fn segment_len(&self, segment_index: u64) -> Option<usize> {
        self.segment(segment_index).ok().map(Segment::len)
    }

    /// Write a value; cells are write-once, rewriting the same value is a no-op
    pub fn write_to_address(
        &mut self,
        address: &MemoryAddress,
        value: MemoryValue,
    ) -> Result<(), MemoryError> {
        let segment = self.segment_mut(address.segment_index)?;
        let idx = usize::try_from(address.offset)
            .map_err(|_| MemoryError::UnaddressableOffset(*address))?;

        if idx >= segment.data.len() {
            segment.data.resize(idx + 1, None);
        }

        match &segment.data[idx] {
            Some(old) if *old != value => Err(MemoryError::Overwrite {
                address: *address,
                old: *old,
                new: value,
            }),
            _ => {
                segment.data[idx] = Some(value);
                Ok(())
            }
        }
    }

    /// Read the value stored at an address
    pub fn read_from_address(&self, address: &MemoryAddress) -> Result<MemoryValue, MemoryError> {
        self.segment(address.segment_index)?
            .get(address.offset)
            .copied()
            .ok_or(MemoryError::UninitializedCell(*address))
    }

    fn segment(&self, segment_index: u64) -> Result<&Segment, MemoryError> {
        usize::try_from(segment_index)
            .ok()
            .and_then(|idx| self.segments.get(idx))
            .ok_or(MemoryError::UnknownSegment { segment_index })
    }

    fn segment_mut(&mut self, segment_index: u64) -> Result<&mut Segment, MemoryError> {
        usize::try_from(segment_index)
            .ok()
            .and_then(|idx| self.segments.get_mut(idx))
            .ok_or(MemoryError::UnknownSegment { segment_index })
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
