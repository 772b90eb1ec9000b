//! Structured lifecycle events for a generation run.
//!
//! Every emitter logs at `info!` with an `event` field, except
//! [`emit_placeholder_used`] which is a `warn!`: a placeholder means a chunk
//! of criteria received scaffold tests instead of generated ones.

use tracing::{info, warn};
use uuid::Uuid;

use crate::repair::RepairDiagnostics;

/// Fresh run id for one pipeline run.
pub fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// The run-scoped span, for instrumenting async work.
pub fn pipeline_span(run_id: &str, assignment_number: u32) -> tracing::Span {
    tracing::info_span!("gradegen.run", run_id = %run_id, assignment = assignment_number)
}

/// Emit event: rubric model built.
pub fn emit_rubric_built(assignment_number: u32, criteria: usize, total_points: f64) {
    info!(
        event = "rubric.built",
        assignment = assignment_number,
        criteria = criteria,
        total_points = total_points,
    );
}

/// Emit event: one chunk came back from the generator.
pub fn emit_chunk_generated(index: usize, total: usize, attempts: u32, validated: bool) {
    info!(
        event = "chunk.generated",
        index = index,
        total = total,
        attempts = attempts,
        validated = validated,
    );
}

/// Emit event: a chunk fell back to placeholder tests.
pub fn emit_placeholder_used(index: usize, criteria: usize, error: &dyn std::fmt::Display) {
    warn!(
        event = "chunk.placeholder",
        index = index,
        criteria = criteria,
        error = %error,
    );
}

/// Emit event: repair finished.
pub fn emit_repair_finished(diag: &RepairDiagnostics) {
    info!(
        event = "repair.finished",
        blocks = diag.blocks_found,
        fixes = diag.fixes_applied(),
        hooks = diag.hook_count,
        balanced = diag.balanced,
        unrecoverable = diag.unrecoverable,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique_uuids() {
        let a = new_run_id();
        let b = new_run_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
