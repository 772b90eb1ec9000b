//! Prompt assembly for the external code generator.
//!
//! [`PromptAssembler`] borrows a [`RubricModel`] and derives three prompt
//! artifacts from it. Large rubrics are split into contiguous chunks so each
//! generation call stays bounded and a failure only costs one chunk.

pub mod templates;

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::domain::{Criterion, CriterionKind, RubricModel};
use templates::{CLOSING_CHECKLIST, EXAMPLE_TESTS, SYSTEM_PROMPT};

/// Criteria counts above this are generated in chunks.
pub const CHUNK_THRESHOLD: usize = 50;
/// Criteria per chunk.
pub const CHUNK_SIZE: usize = 20;

/// The three prompt artifacts sent with one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBundle {
    pub system: String,
    pub rubric: String,
    pub example: String,
}

/// When and how to split criteria into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingPolicy {
    pub threshold: usize,
    pub chunk_size: usize,
}

impl Default for ChunkingPolicy {
    fn default() -> Self {
        Self {
            threshold: CHUNK_THRESHOLD,
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl ChunkingPolicy {
    pub fn needs_chunking(&self, criteria: usize) -> bool {
        criteria > self.threshold
    }

    /// Contiguous index ranges covering `0..len`, in order.
    pub fn ranges(&self, len: usize) -> Vec<Range<usize>> {
        let size = self.chunk_size.max(1);
        (0..len)
            .step_by(size)
            .map(|start| start..(start + size).min(len))
            .collect()
    }
}

/// A rubric prompt scoped to one chunk of criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPrompt {
    /// 1-based chunk index.
    pub index: usize,
    pub total: usize,
    /// Criteria covered, as indices into `RubricModel::criteria`.
    pub range: Range<usize>,
    pub bundle: PromptBundle,
}

/// Stateless prompt builder over a rubric snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PromptAssembler<'a> {
    rubric: &'a RubricModel,
    chunking: ChunkingPolicy,
}

impl<'a> PromptAssembler<'a> {
    pub fn new(rubric: &'a RubricModel) -> Self {
        Self {
            rubric,
            chunking: ChunkingPolicy::default(),
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkingPolicy) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn rubric(&self) -> &'a RubricModel {
        self.rubric
    }

    pub fn chunking(&self) -> ChunkingPolicy {
        self.chunking
    }

    /// Fixed instructions; independent of rubric data.
    pub fn build_system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    /// Every criterion, grouped by kind, followed by the closing checklist.
    pub fn build_rubric_prompt(&self) -> String {
        self.rubric_prompt_for(self.rubric.criteria(), None)
    }

    /// Fixed worked examples spanning the test-type taxonomy.
    pub fn build_example_test(&self) -> String {
        EXAMPLE_TESTS.to_string()
    }

    pub fn bundle(&self) -> PromptBundle {
        PromptBundle {
            system: self.build_system_prompt(),
            rubric: self.build_rubric_prompt(),
            example: self.build_example_test(),
        }
    }

    pub fn needs_chunking(&self) -> bool {
        self.chunking.needs_chunking(self.rubric.len())
    }

    /// One prompt bundle per contiguous chunk, in order.
    pub fn chunk_prompts(&self) -> Vec<ChunkPrompt> {
        let ranges = self.chunking.ranges(self.rubric.len());
        let total = ranges.len();
        ranges
            .into_iter()
            .enumerate()
            .map(|(i, range)| {
                let index = i + 1;
                let criteria = &self.rubric.criteria()[range.clone()];
                ChunkPrompt {
                    index,
                    total,
                    bundle: PromptBundle {
                        system: self.build_system_prompt(),
                        rubric: self.rubric_prompt_for(criteria, Some((index, total))),
                        example: self.build_example_test(),
                    },
                    range,
                }
            })
            .collect()
    }

    fn rubric_prompt_for(&self, criteria: &[Criterion], chunk: Option<(usize, usize)>) -> String {
        let assignment = self.rubric.assignment_number();
        let mut out = format!("RUBRIC FOR ASSIGNMENT {}\n", assignment);

        if let Some((index, total)) = chunk {
            out.push_str(&format!(
                "Chunk {} of {}: generate tests for ONLY the {} criteria listed below.\n",
                index,
                total,
                criteria.len()
            ));
        }
        let possible: f64 = criteria.iter().map(|c| c.points.best).sum();
        out.push_str(&format!(
            "{} criteria, {} points possible in this request ({} in the full rubric).\n",
            criteria.len(),
            possible,
            self.rubric.total_points()
        ));
        out.push_str(&format!(
            "Name the test.describe group 'Assignment {} Rubric'.\n",
            assignment
        ));

        for kind in [CriterionKind::Lab, CriterionKind::Kambaz, CriterionKind::General] {
            let group: Vec<&Criterion> = criteria.iter().filter(|c| c.kind == kind).collect();
            if group.is_empty() {
                continue;
            }
            out.push_str(&format!("\n## {} criteria ({})\n", kind.heading(), group.len()));
            for (n, criterion) in group.iter().enumerate() {
                out.push_str(&describe_criterion(n + 1, criterion));
            }
        }

        out.push_str(&format!("\n{}\n", CLOSING_CHECKLIST));
        out
    }
}

fn describe_criterion(n: usize, c: &Criterion) -> String {
    let mut out = format!("{}. \"{}\"\n   route: {}\n", n, c.original_text, c.route);
    if let Some(category) = &c.category {
        out.push_str(&format!("   category: {}\n", category));
    }
    match (&c.section, &c.subsection) {
        (Some(section), Some(sub)) => out.push_str(&format!("   section: {} / {}\n", section, sub)),
        (Some(section), None) => out.push_str(&format!("   section: {}\n", section)),
        _ => {}
    }
    if !c.detail.is_empty() && c.detail != c.original_text {
        out.push_str(&format!("   detail: {}\n", c.detail));
    }
    out.push_str(&format!(
        "   points: best {} / better {} / almost {} / missing {}\n",
        c.points.best, c.points.better, c.points.almost, c.points.missing
    ));
    out.push_str(&format!("   test type: {}\n", c.test_type_hint));
    out
}
