//! Tagged memory values and their typed arithmetic

use std::fmt;

use super::address::MemoryAddress;
use super::felt::{felt_to_u64, Felt};
use super::memory::MemoryError;

/// Content of a memory cell: either a relocatable address or a field element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryValue {
    /// Relocatable value pointing into a segment
    Address(MemoryAddress),
    /// Plain field element
    Felt(Felt),
}

impl MemoryValue {
    /// Returns true if the value is tagged as an address
    pub fn is_address(&self) -> bool {
        matches!(self, MemoryValue::Address(_))
    }

    /// Returns true if the value is tagged as a field element
    pub fn is_felt(&self) -> bool {
        matches!(self, MemoryValue::Felt(_))
    }

    /// The address held by this value, if it is one
    pub fn as_address(&self) -> Option<&MemoryAddress> {
        match self {
            MemoryValue::Address(addr) => Some(addr),
            MemoryValue::Felt(_) => None,
        }
    }

    /// The field element held by this value, if it is one
    pub fn as_felt(&self) -> Option<&Felt> {
        match self {
            MemoryValue::Felt(felt) => Some(felt),
            MemoryValue::Address(_) => None,
        }
    }

    /// Tag name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            MemoryValue::Address(_) => "address",
            MemoryValue::Felt(_) => "field element",
        }
    }

    /// Typed addition.
    ///
    /// The result is an address whenever either operand is one; adding two
    /// addresses is rejected.
    pub fn add(&self, rhs: &MemoryValue) -> Result<MemoryValue, MemoryError> {
        match (self, rhs) {
            (MemoryValue::Felt(a), MemoryValue::Felt(b)) => Ok(MemoryValue::Felt(*a + *b)),
            (MemoryValue::Address(addr), MemoryValue::Felt(delta))
            | (MemoryValue::Felt(delta), MemoryValue::Address(addr)) => {
                displace(addr, delta).map(MemoryValue::Address)
            }
            (MemoryValue::Address(_), MemoryValue::Address(_)) => {
                Err(MemoryError::invalid_operation("+", self, rhs))
            }
        }
    }

    /// Typed multiplication; only defined on field elements
    pub fn mul(&self, rhs: &MemoryValue) -> Result<MemoryValue, MemoryError> {
        match (self, rhs) {
            (MemoryValue::Felt(a), MemoryValue::Felt(b)) => Ok(MemoryValue::Felt(*a * *b)),
            _ => Err(MemoryError::invalid_operation("*", self, rhs)),
        }
    }
}

/// Shift an address by a field element. Elements whose negation fits in 64
/// bits are read as negative displacements.
fn displace(addr: &MemoryAddress, delta: &Felt) -> Result<MemoryAddress, MemoryError> {
    let offset = if let Some(forward) = felt_to_u64(delta) {
        addr.offset.checked_add(forward)
    } else if let Some(backward) = felt_to_u64(&-*delta) {
        addr.offset.checked_sub(backward)
    } else {
        None
    };

    offset
        .map(|offset| MemoryAddress::new(addr.segment_index, offset))
        .ok_or(MemoryError::AddressOverflow {
            address: *addr,
            delta: *delta,
        })
}

impl From<MemoryAddress> for MemoryValue {
    fn from(addr: MemoryAddress) -> Self {
        MemoryValue::Address(addr)
    }
}

impl From<Felt> for MemoryValue {
    fn from(felt: Felt) -> Self {
        MemoryValue::Felt(felt)
    }
}

impl fmt::Display for MemoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryValue::Address(addr) => write!(f, "{}", addr),
            MemoryValue::Felt(felt) => write!(f, "{}", felt),
        }
    }
}
