//! Diagnostic summary produced by the repair engine.

use serde::{Deserialize, Serialize};

/// What the repair engine changed, and how healthy the result looks.
///
/// Informational only: nothing here blocks artifact emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairDiagnostics {
    /// Registration blocks found in the input.
    pub blocks_found: usize,
    pub imports_removed: usize,
    pub import_inserted: bool,
    pub result_stores_removed: usize,
    pub result_store_inserted: bool,
    pub constants_removed: usize,
    pub constants_inserted: usize,
    pub bodies_filled: usize,
    pub blocks_closed: usize,
    pub recordings_added: usize,
    /// Recording calls cut off mid-statement and replaced.
    pub recordings_dropped: usize,
    pub fragments_dropped: usize,
    pub hooks_removed: usize,
    pub hook_replaced: bool,
    pub hook_synthesized: bool,
    pub group_closed: bool,
    pub group_wrapped: bool,
    /// Finalization hooks present after repair.
    pub hook_count: usize,
    pub open_braces: usize,
    pub close_braces: usize,
    pub open_parens: usize,
    pub close_parens: usize,
    pub balanced: bool,
    /// No registration block could be located; the input was returned unchanged.
    pub unrecoverable: bool,
}

impl RepairDiagnostics {
    /// Total number of structural fixes applied.
    pub fn fixes_applied(&self) -> usize {
        self.imports_removed
            + usize::from(self.import_inserted)
            + self.result_stores_removed
            + usize::from(self.result_store_inserted)
            + self.constants_removed
            + self.constants_inserted
            + self.bodies_filled
            + self.blocks_closed
            + self.recordings_added
            + self.recordings_dropped
            + self.fragments_dropped
            + self.hooks_removed
            + usize::from(self.hook_replaced)
            + usize::from(self.hook_synthesized)
            + usize::from(self.group_closed)
            + usize::from(self.group_wrapped)
    }

    /// `true` when the output needs a human look: unrecoverable input or
    /// unbalanced braces or parens.
    pub fn needs_review(&self) -> bool {
        self.unrecoverable || !self.balanced
    }
}
