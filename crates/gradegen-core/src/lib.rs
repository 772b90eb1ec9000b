//! Rubric-driven test generation: the pure pipeline stages.
//!
//! Rubric rows are classified into a [`RubricModel`], rendered into prompts
//! by [`PromptAssembler`], and the text that comes back from a code
//! generator is merged by [`ChunkCombiner`] and normalized by
//! [`CodeRepairEngine`]. Nothing in this crate performs I/O; the generator
//! client lives in `gradegen-llm`.

pub mod classify;
pub mod combine;
pub mod domain;
pub mod obs;
pub mod prompt;
pub mod repair;
pub mod route;
pub mod script;
pub mod telemetry;

pub use classify::{classify, derive_test_type};
pub use combine::{extract_registration_blocks, ChunkCombiner};
pub use domain::{
    Criterion, CriterionKind, GradegenError, PointScale, RawCell, RawRow, Result, RubricModel,
    TestTypeHint,
};
pub use prompt::{ChunkPrompt, ChunkingPolicy, PromptAssembler, PromptBundle};
pub use repair::{CodeRepairEngine, RepairDiagnostics, RepairOptions, RepairedArtifact};

/// Crate version, as recorded in the workspace manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name the external writer should use for an assignment's artifact.
pub fn artifact_file_name(assignment_number: u32) -> String {
    format!("assignment{}.spec.js", assignment_number)
}
