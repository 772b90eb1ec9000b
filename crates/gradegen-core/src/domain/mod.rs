//! Domain models for gradegen.
//!
//! Canonical definitions for the core entities:
//! - `Criterion`: one gradable rubric line item
//! - `RubricModel`: classified criteria plus totals and sections
//! - `RawCell` / `RawRow`: spreadsheet rows as handed over by the reader

pub mod criterion;
pub mod error;
pub mod rubric;

pub use criterion::{Criterion, CriterionKind, PointScale, TestTypeHint};
pub use error::{GradegenError, Result};
pub use rubric::{RawCell, RawRow, RubricModel, DEFAULT_ASSIGNMENT_NUMBER, HEADER_ROWS};
