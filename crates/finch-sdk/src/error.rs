//! Error types for the Finch SDK ABI

use crate::value::SlotType;

/// Result type for ABI calls
pub type AbiResult<T> = Result<T, NativeError>;

/// Native binding error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NativeError {
    /// Slot held a value of the wrong runtime type
    #[error("Slot {slot}: expected {expected}, got {got}")]
    TypeMismatch {
        /// Slot index that was read
        slot: usize,
        /// Expected type name
        expected: SlotType,
        /// Actual type name
        got: SlotType,
    },

    /// Slot holds a script object that cannot be copied to the host
    #[error("Slot {slot}: {got} value cannot be passed to the host")]
    Unmarshalable {
        /// Slot index that was read
        slot: usize,
        /// Actual type name
        got: SlotType,
    },

    /// Slot index beyond the frame's current capacity
    #[error("Slot {slot} out of range (frame has {count} slots)")]
    SlotOutOfRange {
        /// Requested slot
        slot: usize,
        /// Current slot count
        count: usize,
    },

    /// Foreign storage is not of the requested Rust type
    #[error("Foreign object '{class_name}' does not hold {expected}")]
    StorageMismatch {
        /// Script class of the foreign object
        class_name: String,
        /// Requested Rust type name
        expected: &'static str,
    },

    /// Foreign storage is already borrowed elsewhere in this call
    #[error("Foreign object '{0}' is already borrowed")]
    StorageBorrowed(String),

    /// Invalid argument
    #[error("Argument error: {0}")]
    ArgumentError(String),

    /// Native operation failed
    #[error("{0}")]
    Failed(String),
}

impl NativeError {
    /// True for errors caused by reading or writing slots with the wrong
    /// shape, as opposed to failures inside the native operation.
    pub fn is_marshal(&self) -> bool {
        matches!(
            self,
            NativeError::TypeMismatch { .. }
                | NativeError::Unmarshalable { .. }
                | NativeError::SlotOutOfRange { .. }
                | NativeError::StorageMismatch { .. }
                | NativeError::StorageBorrowed(_)
        )
    }
}

impl From<String> for NativeError {
    fn from(s: String) -> Self {
        NativeError::Failed(s)
    }
}

impl From<&str> for NativeError {
    fn from(s: &str) -> Self {
        NativeError::Failed(s.to_string())
    }
}

/// Errors raised while building a registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A second entry used an already registered key
    #[error("Duplicate foreign binding: {0}")]
    DuplicateKey(String),

    /// Signature string is not `name`, `name(_,..)`, `name=(_)` or a subscript form
    #[error("Invalid signature '{0}'")]
    InvalidSignature(String),
}
