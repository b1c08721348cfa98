//! Register state of the running VM

use super::address::MemoryAddress;
use super::{Registers, PROGRAM_SEGMENT};

/// Live register values: allocation pointer, frame pointer and program counter.
///
/// `ap` and `fp` are offsets into the execution segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    /// Allocation pointer
    pub ap: u64,
    /// Frame pointer
    pub fp: u64,
    /// Program counter
    pub pc: MemoryAddress,
}

impl Context {
    /// Context at the start of a run, with both pointers at `initial_fp`
    pub fn new(initial_fp: u64) -> Self {
        Context {
            ap: initial_fp,
            fp: initial_fp,
            pc: MemoryAddress::new(PROGRAM_SEGMENT, 0),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Registers for Context {
    fn ap(&self) -> u64 {
        self.ap
    }

    fn fp(&self) -> u64 {
        self.fp
    }
}
