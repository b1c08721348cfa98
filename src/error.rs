//! Error types for hint operand resolution

use thiserror::Error;

use crate::vm::memory::MemoryError;

/// Errors raised while turning a symbolic reference into an address or a value
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Checked address arithmetic left the representable offset range
    ///
    /// **Triggered by:** `ap + offset`, `fp + offset` or `pointer + offset` not fitting in a `u64`
    /// **Example:** `ApCellRef(-1)` with `ap = 0`
    #[error("Offset overflow: {base} + {offset}")]
    OffsetOverflow {
        /// Base offset (register value or pointer offset)
        base: u64,
        /// Signed displacement applied to the base
        offset: i16,
    },

    /// Attempt to read the value of a reference that only names a location
    ///
    /// **Triggered by:** `resolve` on a bare `ApCellRef` / `FpCellRef`
    /// **Prevention:** Wrap the cell reference in a `Deref`
    #[error("Cannot resolve {reference}: a cell reference names a location, not a value")]
    UnresolvableReference {
        /// Diagnostic rendering of the reference
        reference: String,
    },

    /// Attempt to take the address of a reference that only denotes a value
    ///
    /// **Triggered by:** `get_address` on `Immediate` or `BinaryOp`
    #[error("Cannot get an address from {reference}")]
    NotAddressable {
        /// Diagnostic rendering of the reference
        reference: String,
    },

    /// A value had the wrong tag for the operation
    ///
    /// **Triggered by:** a `DoubleDeref` whose first indirection yields a field element
    #[error("Type error: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected tag
        expected: String,
        /// Actual tag
        got: String,
    },

    /// Binary operator without a resolution rule
    #[error("Unknown binary operator: {operator}")]
    UnknownOperator {
        /// Operator tag as received
        operator: String,
    },

    /// Failure reported by the memory subsystem or its tagged arithmetic
    #[error(transparent)]
    Memory(#[from] MemoryError),

    /// An error annotated with the sub-reference or operand side that produced it
    #[error("{context}: {source}")]
    Context {
        /// What was being done when the error occurred
        context: String,
        /// Underlying error
        source: Box<Error>,
    },
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The resolution attempt cannot succeed against this VM state
    Fatal,
    /// The hint layer may still make progress, e.g. by deducing the missing cell
    Recoverable,
}

impl Error {
    /// Wrap this error with a description of the step that failed
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a type mismatch error from two tag names
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Strip all `Context` wrappers and return the underlying error
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self.root_cause() {
            Error::Memory(MemoryError::UninitializedCell(_)) => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Fatal,
        }
    }
}

/// Result type for hint operand resolution
pub type Result<T> = std::result::Result<T, Error>;
