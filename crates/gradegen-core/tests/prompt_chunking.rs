use gradegen_core::prompt::{CHUNK_SIZE, CHUNK_THRESHOLD};
use gradegen_core::{ChunkingPolicy, PromptAssembler, RawCell, RawRow, RubricModel};

fn rubric(criteria: usize) -> RubricModel {
    let mut rows: Vec<RawRow> = vec![vec!["Criteria".into()], vec!["".into()]];
    for i in 0..criteria {
        let text = format!("Kambaz - Modules - module {} renders", i);
        rows.push(vec![RawCell::from(text.as_str()), 3.0.into()]);
    }
    RubricModel::build(&rows, 4)
}

#[test]
fn small_rubric_is_not_chunked() {
    let model = rubric(CHUNK_THRESHOLD);
    let assembler = PromptAssembler::new(&model);
    assert!(!assembler.needs_chunking());
}

#[test]
fn chunk_count_is_ceiling_of_len_over_size() {
    for len in [51, 60, 61, 100, 137] {
        let model = rubric(len);
        let chunks = PromptAssembler::new(&model).chunk_prompts();
        assert_eq!(chunks.len(), len.div_ceil(CHUNK_SIZE), "len {}", len);
    }
}

#[test]
fn chunks_reconstruct_criteria_order() {
    let model = rubric(73);
    let assembler = PromptAssembler::new(&model);
    assert!(assembler.needs_chunking());

    let chunks = assembler.chunk_prompts();
    let covered: Vec<usize> = chunks.iter().flat_map(|c| c.range.clone()).collect();
    assert_eq!(covered, (0..73).collect::<Vec<_>>());

    for chunk in &chunks {
        assert!(chunk
            .bundle
            .rubric
            .contains(&format!("Chunk {} of {}", chunk.index, chunk.total)));
        for i in chunk.range.clone() {
            let text = &model.criteria()[i].original_text;
            assert!(chunk.bundle.rubric.contains(text.as_str()));
        }
    }
}

#[test]
fn custom_policy_changes_partition() {
    let model = rubric(12);
    let chunks = PromptAssembler::new(&model)
        .with_chunking(ChunkingPolicy {
            threshold: 5,
            chunk_size: 5,
        })
        .chunk_prompts();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[2].range, 10..12);
}

#[test]
fn rubric_prompt_carries_routes_and_points() {
    let model = rubric(2);
    let prompt = PromptAssembler::new(&model).build_rubric_prompt();
    assert!(prompt.contains("RUBRIC FOR ASSIGNMENT 4"));
    assert!(prompt.contains("route: courses/:courseId/modules"));
    assert!(prompt.contains("points: best 3 / better 2 / almost 1 / missing 0"));
}
