//! End-to-end orchestration: rubric in, repaired artifact out.
//!
//! Small rubrics are generated in one call and a failure propagates.
//! Large rubrics are generated chunk by chunk, in order; a chunk that
//! cannot be generated is replaced by placeholder scaffolds so the run
//! always yields one test per criterion.

use gradegen_core::obs::{
    emit_chunk_generated, emit_placeholder_used, emit_rubric_built, new_run_id, pipeline_span,
};
use gradegen_core::{
    artifact_file_name, ChunkCombiner, ChunkPrompt, ChunkingPolicy, CodeRepairEngine,
    PromptAssembler, RepairOptions, RepairedArtifact, RubricModel,
};
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};

use crate::client::GenerationClient;
use crate::error::Result;
use crate::placeholder::placeholder_module;

/// How one chunk's code was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChunkOutcome {
    Generated { attempts: u32 },
    Placeholder { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkReport {
    /// 1-based.
    pub index: usize,
    pub total: usize,
    pub criteria: usize,
    pub outcome: ChunkOutcome,
}

impl ChunkReport {
    pub fn used_placeholder(&self) -> bool {
        matches!(self.outcome, ChunkOutcome::Placeholder { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub run_id: String,
    /// Name the artifact should be written under.
    pub file_name: String,
    pub artifact: RepairedArtifact,
    pub chunks: Vec<ChunkReport>,
}

pub struct GenerationPipeline {
    client: GenerationClient,
    chunking: ChunkingPolicy,
}

impl GenerationPipeline {
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client,
            chunking: ChunkingPolicy::default(),
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkingPolicy) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    pub async fn run(&self, rubric: &RubricModel) -> Result<PipelineOutput> {
        let run_id = new_run_id();
        let span = pipeline_span(&run_id, rubric.assignment_number());
        self.run_inner(rubric, run_id).instrument(span).await
    }

    async fn run_inner(&self, rubric: &RubricModel, run_id: String) -> Result<PipelineOutput> {
        let assignment = rubric.assignment_number();
        emit_rubric_built(assignment, rubric.len(), rubric.total_points());

        let assembler = PromptAssembler::new(rubric).with_chunking(self.chunking);
        let (code, chunks) = if assembler.needs_chunking() {
            self.generate_chunked(rubric, &assembler).await
        } else {
            let bundle = assembler.bundle();
            let generated = self
                .client
                .generate_with_retry(&bundle.system, &bundle.rubric, &bundle.example)
                .await?;
            emit_chunk_generated(1, 1, generated.attempts, generated.validated);
            let report = ChunkReport {
                index: 1,
                total: 1,
                criteria: rubric.len(),
                outcome: ChunkOutcome::Generated {
                    attempts: generated.attempts,
                },
            };
            (generated.code, vec![report])
        };

        let engine = CodeRepairEngine::new(RepairOptions::for_rubric(rubric));
        let artifact = engine.repair(&code);
        info!(
            file = %artifact_file_name(assignment),
            digest = %artifact.digest,
            placeholders = chunks.iter().filter(|c| c.used_placeholder()).count(),
            "artifact ready"
        );

        Ok(PipelineOutput {
            run_id,
            file_name: artifact_file_name(assignment),
            artifact,
            chunks,
        })
    }

    async fn generate_chunked(
        &self,
        rubric: &RubricModel,
        assembler: &PromptAssembler<'_>,
    ) -> (String, Vec<ChunkReport>) {
        let prompts = assembler.chunk_prompts();
        info!(chunks = prompts.len(), criteria = rubric.len(), "generating in chunks");

        let mut outputs = Vec::with_capacity(prompts.len());
        let mut reports = Vec::with_capacity(prompts.len());
        for prompt in &prompts {
            let (code, outcome) = self.generate_chunk(rubric, prompt).await;
            outputs.push(code);
            reports.push(ChunkReport {
                index: prompt.index,
                total: prompt.total,
                criteria: prompt.range.len(),
                outcome,
            });
        }

        let title = format!("Assignment {} Rubric", rubric.assignment_number());
        (ChunkCombiner::new(title).combine(&outputs), reports)
    }

    async fn generate_chunk(
        &self,
        rubric: &RubricModel,
        prompt: &ChunkPrompt,
    ) -> (String, ChunkOutcome) {
        let bundle = &prompt.bundle;
        let reason = match self
            .client
            .generate_with_retry(&bundle.system, &bundle.rubric, &bundle.example)
            .await
        {
            Ok(generated) if generated.validated => {
                emit_chunk_generated(prompt.index, prompt.total, generated.attempts, true);
                let outcome = ChunkOutcome::Generated {
                    attempts: generated.attempts,
                };
                return (generated.code, outcome);
            }
            Ok(generated) => {
                emit_chunk_generated(prompt.index, prompt.total, generated.attempts, false);
                "candidate has no test registration".to_string()
            }
            Err(err) => err.to_string(),
        };

        let criteria = &rubric.criteria()[prompt.range.clone()];
        emit_placeholder_used(prompt.index, criteria.len(), &reason);
        (
            placeholder_module(criteria),
            ChunkOutcome::Placeholder { reason },
        )
    }
}
