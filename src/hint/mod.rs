//! Operand references used by hints

mod ap_tracking;
mod operand;

pub use ap_tracking::ApTracking;
pub use operand::{
    ApCellRef, BinaryOp, Deref, DoubleDeref, FpCellRef, Immediate, Operator, Reference,
};
