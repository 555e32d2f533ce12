//! Error types for tuple construction and typed access
//!
//! Every variant describes a contract violation: a caller asked for an index
//! or a type the tuple does not have. The infallible accessors panic with the
//! same diagnostics; the `try_*` and constructor APIs return them.

use thiserror::Error;

/// Tuple access and view construction errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TupleError {
    /// Index is not a slot of the tuple
    #[error("Index out of range: index {index} >= size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// Index mapping length differs from the view's type list length
    #[error("Mapping size mismatch: view has {expected} element types, mapping has {actual} entries")]
    SizeMismatch { expected: usize, actual: usize },

    /// Slot holds a different type than the one requested
    #[error("Type mismatch at position {position}: expected {expected}, slot holds {actual}")]
    TypeMismatch {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Result alias for tuple operations
pub type TupleResult<T> = std::result::Result<T, TupleError>;

impl TupleError {
    /// Create an index out of range error
    pub fn index_out_of_range(index: usize, size: usize) -> Self {
        Self::IndexOutOfRange { index, size }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(position: usize, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            position,
            expected,
            actual,
        }
    }
}
