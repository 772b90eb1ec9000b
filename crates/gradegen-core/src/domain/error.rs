//! Domain-level error taxonomy for gradegen.
//!
//! Classification and repair never fail; these errors cover the few places
//! where a caller hands over input that cannot be interpreted at all.

/// gradegen domain errors.
#[derive(Debug, thiserror::Error)]
pub enum GradegenError {
    #[error("invalid assignment number: {0}")]
    InvalidAssignmentNumber(i64),

    #[error("invalid rubric row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for gradegen domain operations.
pub type Result<T> = std::result::Result<T, GradegenError>;
