//! Symbolic operand references and their resolution
//!
//! A hint names the VM values it works on through [`Reference`] trees whose
//! leaves are relative to `ap` or `fp`. Before a tree is used at a program
//! point, [`Reference::apply_ap_tracking`] compensates for the `ap` drift
//! between where the reference was recorded and where it is evaluated; the
//! corrected tree then yields either a location ([`Reference::get_address`])
//! or a value ([`Reference::resolve`]).

use std::fmt;

use tracing::{debug, trace};

use super::ap_tracking::ApTracking;
use crate::error::{Error, Result};
use crate::vm::{
    safe_offset, Felt, MemoryAddress, MemoryValue, Registers, VmView, EXECUTION_SEGMENT,
};

/// Operand reference tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Cell at `ap + offset`
    ApCell(ApCellRef),
    /// Cell at `fp + offset`
    FpCell(FpCellRef),
    /// Value stored at the inner reference's address
    Deref(Deref),
    /// Value stored at `[inner] + offset`
    DoubleDeref(DoubleDeref),
    /// Compile-time constant
    Immediate(Immediate),
    /// Arithmetic combination of two references
    BinaryOp(BinaryOp),
}

impl Reference {
    /// Resolve the location this reference denotes
    pub fn get_address<V: VmView + ?Sized>(&self, vm: &V) -> Result<MemoryAddress> {
        trace!(reference = %self, "get address");
        match self {
            Reference::ApCell(cell) => cell.get_address(vm),
            Reference::FpCell(cell) => cell.get_address(vm),
            Reference::Deref(deref) => deref.get_address(vm),
            Reference::DoubleDeref(dderef) => dderef.get_address(vm),
            Reference::Immediate(imm) => imm.get_address(vm),
            Reference::BinaryOp(bop) => bop.get_address(vm),
        }
    }

    /// Resolve the value this reference denotes, reading memory if needed
    pub fn resolve<V: VmView + ?Sized>(&self, vm: &V) -> Result<MemoryValue> {
        trace!(reference = %self, "resolve");
        match self {
            Reference::ApCell(cell) => cell.resolve(vm),
            Reference::FpCell(cell) => cell.resolve(vm),
            Reference::Deref(deref) => deref.resolve(vm),
            Reference::DoubleDeref(dderef) => dderef.resolve(vm),
            Reference::Immediate(imm) => imm.resolve(vm),
            Reference::BinaryOp(bop) => bop.resolve(vm),
        }
    }

    /// Rebuild the tree with every `ap`-relative leaf shifted back by the
    /// `ap` advance between `recorded` and `current`.
    ///
    /// The receiver is left untouched so it can be corrected again for
    /// another program point.
    pub fn apply_ap_tracking(&self, recorded: ApTracking, current: ApTracking) -> Reference {
        match self {
            Reference::ApCell(cell) => cell.apply_ap_tracking(recorded, current).into(),
            Reference::FpCell(cell) => cell.apply_ap_tracking(recorded, current).into(),
            Reference::Deref(deref) => deref.apply_ap_tracking(recorded, current).into(),
            Reference::DoubleDeref(dderef) => dderef.apply_ap_tracking(recorded, current).into(),
            Reference::Immediate(imm) => imm.apply_ap_tracking(recorded, current).into(),
            Reference::BinaryOp(bop) => bop.apply_ap_tracking(recorded, current).into(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::ApCell(cell) => cell.fmt(f),
            Reference::FpCell(cell) => cell.fmt(f),
            Reference::Deref(deref) => deref.fmt(f),
            Reference::DoubleDeref(dderef) => dderef.fmt(f),
            Reference::Immediate(imm) => imm.fmt(f),
            Reference::BinaryOp(bop) => bop.fmt(f),
        }
    }
}

fn cell_address(base: u64, offset: i16) -> Result<MemoryAddress> {
    safe_offset(base, offset)
        .map(|offset| MemoryAddress::new(EXECUTION_SEGMENT, offset))
        .ok_or(Error::OffsetOverflow { base, offset })
}

fn read_cell<V: VmView + ?Sized>(vm: &V, address: &MemoryAddress) -> Result<MemoryValue> {
    vm.read_from_address(address).map_err(|err| {
        debug!(%address, error = %err, "memory read failed");
        Error::from(err)
    })
}

/// Cell at `ap + offset` in the execution segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApCellRef(pub i16);

impl ApCellRef {
    /// Address `ap + offset`
    pub fn get_address<V: Registers + ?Sized>(&self, vm: &V) -> Result<MemoryAddress> {
        cell_address(vm.ap(), self.0)
    }

    /// Always fails: a cell reference names a location
    pub fn resolve<V: VmView + ?Sized>(&self, _vm: &V) -> Result<MemoryValue> {
        Err(Error::UnresolvableReference {
            reference: self.to_string(),
        })
    }

    /// Shift the offset by the `ap` advance when both descriptors share a group
    pub fn apply_ap_tracking(&self, recorded: ApTracking, current: ApTracking) -> ApCellRef {
        if !recorded.same_group(&current) {
            debug!(
                reference = %self,
                recorded_group = recorded.group,
                current_group = current.group,
                "ap-tracking group mismatch, leaving reference as is"
            );
            return *self;
        }

        let corrected = ApCellRef(self.0.wrapping_sub(recorded.offset_delta(&current)));
        if corrected != *self {
            debug!(from = %self, to = %corrected, "ap-tracking correction");
        }
        corrected
    }

    /// The cell `offset` cells further, or `None` on overflow
    pub fn add_offset(&self, offset: i16) -> Option<ApCellRef> {
        self.0.checked_add(offset).map(ApCellRef)
    }
}

impl fmt::Display for ApCellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApCellRef({})", self.0)
    }
}

/// Cell at `fp + offset` in the execution segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FpCellRef(pub i16);

impl FpCellRef {
    /// Address `fp + offset`
    pub fn get_address<V: Registers + ?Sized>(&self, vm: &V) -> Result<MemoryAddress> {
        cell_address(vm.fp(), self.0)
    }

    /// Always fails: a cell reference names a location
    pub fn resolve<V: VmView + ?Sized>(&self, _vm: &V) -> Result<MemoryValue> {
        Err(Error::UnresolvableReference {
            reference: self.to_string(),
        })
    }

    /// `fp` does not move within a call; always the identity
    pub fn apply_ap_tracking(&self, _recorded: ApTracking, _current: ApTracking) -> FpCellRef {
        *self
    }

    /// The cell `offset` cells further, or `None` on overflow
    pub fn add_offset(&self, offset: i16) -> Option<FpCellRef> {
        self.0.checked_add(offset).map(FpCellRef)
    }
}

impl fmt::Display for FpCellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FpCellRef({})", self.0)
    }
}

/// One level of indirection.
///
/// The address of a `Deref` is the address of its inner reference; its value
/// is the memory content at that address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deref(pub Box<Reference>);

impl Deref {
    /// Wrap a reference
    pub fn new(inner: impl Into<Reference>) -> Self {
        Deref(Box::new(inner.into()))
    }

    /// The dereferenced reference
    pub fn inner(&self) -> &Reference {
        &self.0
    }

    pub fn get_address<V: VmView + ?Sized>(&self, vm: &V) -> Result<MemoryAddress> {
        self.0.get_address(vm)
    }

    pub fn resolve<V: VmView + ?Sized>(&self, vm: &V) -> Result<MemoryValue> {
        let address = self
            .get_address(vm)
            .map_err(|err| err.context("get cell address"))?;
        read_cell(vm, &address)
    }

    pub fn apply_ap_tracking(&self, recorded: ApTracking, current: ApTracking) -> Deref {
        Deref(Box::new(self.0.apply_ap_tracking(recorded, current)))
    }
}

impl fmt::Display for Deref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deref({})", self.0)
    }
}

/// Two levels of indirection: `[[inner] + offset]`.
///
/// The first read must produce an address; `offset` is added to it within
/// the same segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleDeref {
    /// First indirection, yielding a pointer
    pub deref: Deref,
    /// Static displacement added to the pointer
    pub offset: i16,
}

impl DoubleDeref {
    pub fn new(deref: Deref, offset: i16) -> Self {
        DoubleDeref { deref, offset }
    }

    pub fn get_address<V: VmView + ?Sized>(&self, vm: &V) -> Result<MemoryAddress> {
        let lhs = self
            .deref
            .resolve(vm)
            .map_err(|err| err.context("get lhs address"))?;

        let address = lhs
            .as_address()
            .ok_or_else(|| Error::type_mismatch("address", lhs.kind_name()))?;

        address.add_offset(self.offset).ok_or(Error::OffsetOverflow {
            base: address.offset,
            offset: self.offset,
        })
    }

    pub fn resolve<V: VmView + ?Sized>(&self, vm: &V) -> Result<MemoryValue> {
        let address = self.get_address(vm)?;
        read_cell(vm, &address).map_err(|err| err.context(format!("read result at {}", address)))
    }

    /// Corrects the inner indirection only; the static offset is kept
    pub fn apply_ap_tracking(&self, recorded: ApTracking, current: ApTracking) -> DoubleDeref {
        DoubleDeref {
            deref: self.deref.apply_ap_tracking(recorded, current),
            offset: self.offset,
        }
    }
}

impl fmt::Display for DoubleDeref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DoubleDeref({}, {})", self.deref, self.offset)
    }
}

/// Constant captured at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Immediate(pub Felt);

impl Immediate {
    /// Always fails: a constant has no location
    pub fn get_address<V: VmView + ?Sized>(&self, _vm: &V) -> Result<MemoryAddress> {
        Err(Error::NotAddressable {
            reference: self.to_string(),
        })
    }

    pub fn resolve<V: VmView + ?Sized>(&self, _vm: &V) -> Result<MemoryValue> {
        Ok(MemoryValue::Felt(self.0))
    }

    pub fn apply_ap_tracking(&self, _recorded: ApTracking, _current: ApTracking) -> Immediate {
        *self
    }
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Immediate({})", self.0)
    }
}

/// Binary operator tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Addition; address + field element is allowed
    Add,
    /// Multiplication of field elements
    Mul,
    /// Declared by the compiler but without a resolution rule
    Sub,
}

impl TryFrom<u8> for Operator {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Operator::Add),
            1 => Ok(Operator::Mul),
            2 => Ok(Operator::Sub),
            other => Err(Error::UnknownOperator {
                operator: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Mul => "*",
            Operator::Sub => "-",
        };
        write!(f, "{}", symbol)
    }
}

/// Arithmetic combination of two resolved references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOp {
    pub operator: Operator,
    pub lhs: Box<Reference>,
    pub rhs: Box<Reference>,
}

impl BinaryOp {
    pub fn new(operator: Operator, lhs: impl Into<Reference>, rhs: impl Into<Reference>) -> Self {
        BinaryOp {
            operator,
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        }
    }

    /// Always fails.
    ///
    /// Some shapes, e.g. `Deref + Immediate`, could denote an address, but no
    /// rule is defined for them.
    pub fn get_address<V: VmView + ?Sized>(&self, _vm: &V) -> Result<MemoryAddress> {
        Err(Error::NotAddressable {
            reference: self.to_string(),
        })
    }

    pub fn resolve<V: VmView + ?Sized>(&self, vm: &V) -> Result<MemoryValue> {
        let lhs = self
            .lhs
            .resolve(vm)
            .map_err(|err| err.context(format!("resolve lhs operand {}", self.lhs)))?;
        let rhs = self
            .rhs
            .resolve(vm)
            .map_err(|err| err.context(format!("resolve rhs operand {}", self.rhs)))?;

        match self.operator {
            Operator::Add => Ok(lhs.add(&rhs)?),
            Operator::Mul => Ok(lhs.mul(&rhs)?),
            Operator::Sub => Err(Error::UnknownOperator {
                operator: self.operator.to_string(),
            }),
        }
    }

    pub fn apply_ap_tracking(&self, recorded: ApTracking, current: ApTracking) -> BinaryOp {
        BinaryOp {
            operator: self.operator,
            lhs: Box::new(self.lhs.apply_ap_tracking(recorded, current)),
            rhs: Box::new(self.rhs.apply_ap_tracking(recorded, current)),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryOp({} {} {})", self.lhs, self.operator, self.rhs)
    }
}

impl From<ApCellRef> for Reference {
    fn from(cell: ApCellRef) -> Self {
        Reference::ApCell(cell)
    }
}

impl From<FpCellRef> for Reference {
    fn from(cell: FpCellRef) -> Self {
        Reference::FpCell(cell)
    }
}

impl From<Deref> for Reference {
    fn from(deref: Deref) -> Self {
        Reference::Deref(deref)
    }
}

impl From<DoubleDeref> for Reference {
    fn from(dderef: DoubleDeref) -> Self {
        Reference::DoubleDeref(dderef)
    }
}

impl From<Immediate> for Reference {
    fn from(imm: Immediate) -> Self {
        Reference::Immediate(imm)
    }
}

impl From<BinaryOp> for Reference {
    fn from(bop: BinaryOp) -> Self {
        Reference::BinaryOp(bop)
    }
}
