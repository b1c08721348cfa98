//! The slice of the virtual machine that hint operands read from
//!
//! Reference resolution only needs two capabilities from a machine: the
//! current `ap`/`fp` registers ([`Registers`]) and read access to memory
//! ([`MemoryReader`]). [`VirtualMachine`] is a minimal machine providing both.

pub mod address;
mod context;
pub mod felt;
pub mod memory;
mod value;

pub use address::{safe_offset, MemoryAddress};
pub use context::Context;
pub use felt::{felt_to_u64, Felt};
pub use memory::{Memory, MemoryError, Segment};
pub use value::MemoryValue;

/// Segment holding the program bytecode
pub const PROGRAM_SEGMENT: u64 = 0;

/// Segment addressed by `ap`/`fp`-relative references
pub const EXECUTION_SEGMENT: u64 = 1;

/// Access to the live allocation and frame pointers
pub trait Registers {
    /// Current allocation pointer, as an offset into the execution segment
    fn ap(&self) -> u64;

    /// Current frame pointer, as an offset into the execution segment
    fn fp(&self) -> u64;
}

/// Read-only access to VM memory
pub trait MemoryReader {
    /// Read the value stored at `address`
    fn read_from_address(&self, address: &MemoryAddress) -> Result<MemoryValue, MemoryError>;
}

/// Everything a reference needs to resolve against
pub trait VmView: Registers + MemoryReader {}

impl<T: Registers + MemoryReader + ?Sized> VmView for T {}

impl MemoryReader for Memory {
    fn read_from_address(&self, address: &MemoryAddress) -> Result<MemoryValue, MemoryError> {
        Memory::read_from_address(self, address)
    }
}

/// Registers plus memory
#[derive(Debug, Clone, Default)]
pub struct VirtualMachine {
    /// Register state
    pub context: Context,
    /// Memory segments
    pub memory: Memory,
}

impl VirtualMachine {
    /// Creates a machine with empty memory and the given register state
    pub fn new(context: Context) -> Self {
        VirtualMachine {
            context,
            memory: Memory::new(),
        }
    }

    /// Write a value at `offset` in the execution segment
    pub fn write_execution_cell(
        &mut self,
        offset: u64,
        value: impl Into<MemoryValue>,
    ) -> Result<(), MemoryError> {
        self.memory
            .write_to_address(&MemoryAddress::new(EXECUTION_SEGMENT, offset), value.into())
    }
}

impl Registers for VirtualMachine {
    fn ap(&self) -> u64 {
        self.context.ap
    }

    fn fp(&self) -> u64 {
        self.context.fp
    }
}

impl MemoryReader for VirtualMachine {
    fn read_from_address(&self, address: &MemoryAddress) -> Result<MemoryValue, MemoryError> {
        self.memory.read_from_address(address)
    }
}
