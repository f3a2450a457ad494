//! Error types for Horizon Table.

use std::fmt;

/// Which kind of index an [`ModelError::OutOfRange`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// A row index.
    Row,
    /// A column index.
    Column,
    /// An insertion position, valid up to and including the row count.
    Insertion,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => write!(f, "row"),
            Self::Column => write!(f, "column"),
            Self::Insertion => write!(f, "insertion"),
        }
    }
}

/// The error type for table model operations.
///
/// Every failing operation is validated before any state changes, so a
/// returned error means the model is exactly as it was and no event fired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A row, column, or insertion index was outside its valid range.
    #[error("{kind} index {index} out of range (bound {bound})")]
    OutOfRange {
        /// Which index was rejected.
        kind: IndexKind,
        /// The rejected index.
        index: usize,
        /// The exclusive upper bound (inclusive for insertions).
        bound: usize,
    },

    /// An argument was malformed, such as a row of the wrong width or a
    /// column order naming the same column twice.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A comparator was asked to order values it cannot compare.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A mutation was requested while the same model was still delivering
    /// events for an earlier mutation.
    #[error("reentrant call to {0} during event dispatch")]
    Reentrant(&'static str),
}

impl ModelError {
    /// Create an out-of-range error for a row index.
    pub fn row(index: usize, bound: usize) -> Self {
        Self::OutOfRange {
            kind: IndexKind::Row,
            index,
            bound,
        }
    }

    /// Create an out-of-range error for a column index.
    pub fn column(index: usize, bound: usize) -> Self {
        Self::OutOfRange {
            kind: IndexKind::Column,
            index,
            bound,
        }
    }

    /// Create an out-of-range error for an insertion position.
    pub fn insertion(index: usize, bound: usize) -> Self {
        Self::OutOfRange {
            kind: IndexKind::Insertion,
            index,
            bound,
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an unsupported-comparison error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Returns `true` if this is an out-of-range error.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    /// Check `index < bound` for a row index.
    pub fn check_row(index: usize, bound: usize) -> ModelResult<()> {
        if index < bound {
            Ok(())
        } else {
            Err(Self::row(index, bound))
        }
    }

    /// Check `index < bound` for a column index.
    pub fn check_column(index: usize, bound: usize) -> ModelResult<()> {
        if index < bound {
            Ok(())
        } else {
            Err(Self::column(index, bound))
        }
    }
}

/// A specialized Result type for table model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = ModelError::row(5, 3);
        assert_eq!(err.to_string(), "row index 5 out of range (bound 3)");
        assert!(err.is_out_of_range());
    }

    #[test]
    fn test_checks() {
        assert!(ModelError::check_row(2, 3).is_ok());
        assert_eq!(ModelError::check_row(3, 3), Err(ModelError::row(3, 3)));
        assert_eq!(
            ModelError::check_column(1, 1),
            Err(ModelError::column(1, 1))
        );
    }

    #[test]
    fn test_reentrant_display() {
        let err = ModelError::Reentrant("set_value");
        assert_eq!(
            err.to_string(),
            "reentrant call to set_value during event dispatch"
        );
        assert!(!err.is_out_of_range());
    }
}
