#![allow(missing_docs)]
//! # Hinter - operand references for VM hints
//!
//! Hints run between VM steps and refer to machine values through symbolic
//! references: cells relative to `ap` or `fp`, one or two levels of
//! indirection, constants, and sums or products of those. This crate turns
//! such a reference into a concrete [`MemoryAddress`] or [`MemoryValue`]
//! against a live machine.
//!
//! ## Quick Start
//!
//! ```rust
//! use hinter::{
//!     ApCellRef, ApTracking, BinaryOp, Context, Deref, Felt, Immediate, MemoryAddress,
//!     MemoryValue, Operator, Reference, VirtualMachine,
//! };
//!
//! # fn main() -> hinter::Result<()> {
//! let mut vm = VirtualMachine::new(Context { ap: 8, fp: 4, pc: MemoryAddress::new(0, 0) });
//! vm.write_execution_cell(5, Felt::from(20u64))?;
//!
//! // [ap + 0] + 2, recorded when ap was three cells further back
//! let reference: Reference =
//!     BinaryOp::new(Operator::Add, Deref::new(ApCellRef(0)), Immediate(Felt::from(2u64))).into();
//!
//! let corrected = reference.apply_ap_tracking(ApTracking::new(1, 3), ApTracking::new(1, 0));
//! assert_eq!(corrected.resolve(&vm)?, MemoryValue::Felt(Felt::from(22u64)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Reference ──apply_ap_tracking──▶ Reference ──get_address / resolve──▶ MemoryAddress / MemoryValue
//!                                                   │
//!                                                   ▼
//!                                      Registers (ap, fp) + MemoryReader
//! ```
//!
//! - [`Reference`] - closed set of reference variants
//! - [`ApTracking`] - compiler-recorded `ap` position used for correction
//! - [`vm`] - the machine capabilities references resolve against, plus a
//!   minimal [`VirtualMachine`] implementing them
//! - [`Error`] - resolution failures

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod hint;
pub mod vm;

// Re-export main types
pub use error::{Error, ErrorSeverity, Result};
pub use hint::{
    ApCellRef, ApTracking, BinaryOp, Deref, DoubleDeref, FpCellRef, Immediate, Operator, Reference,
};
pub use vm::{
    Context, Felt, Memory, MemoryAddress, MemoryError, MemoryReader, MemoryValue, Registers,
    VirtualMachine, VmView, EXECUTION_SEGMENT,
};
