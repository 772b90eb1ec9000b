use gradegen_core::script::templates::{FRAMEWORK_IMPORT, SUMMARY_MARKER};
use gradegen_core::{ChunkCombiner, CodeRepairEngine};

fn chunk(titles: &[&str]) -> String {
    let mut out = String::from("import { test, expect } from '@playwright/test';\n\n");
    out.push_str("const testResults = [];\n\n");
    out.push_str("test.describe('Partial', () => {\n");
    for title in titles {
        out.push_str(&format!(
            "  test('{t}', async ({{ page }}) => {{\n    try {{\n      await page.goto('/');\n      await expect(page.locator('h1')).toBeVisible();\n      testResults.push({{ criterion: '{t}', points: {{ earned: 3, possible: 3 }}, passed: true, details: 'ok' }});\n    }} catch (error) {{\n      testResults.push({{ criterion: '{t}', points: {{ earned: 0, possible: 3 }}, passed: false, details: String(error) }});\n    }}\n  }});\n\n",
            t = title
        ));
    }
    out.push_str("  test.afterAll(async () => {\n    console.log(testResults.length);\n  });\n});\n");
    out
}

#[test]
fn combined_chunks_keep_every_block_in_order() {
    let chunks = [chunk(&["one", "two"]), chunk(&["three"]), chunk(&["four", "five"])];
    let out = ChunkCombiner::new("Assignment 5 Rubric").combine(&chunks);

    let positions: Vec<usize> = ["'one'", "'two'", "'three'", "'four'", "'five'"]
        .iter()
        .map(|t| out.find(&format!("test({}", t)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    assert_eq!(out.matches(FRAMEWORK_IMPORT).count(), 1);
    assert_eq!(out.matches("const testResults = [];").count(), 1);
    assert_eq!(out.matches("test.afterAll(").count(), 1);
    assert_eq!(out.matches("test.describe(").count(), 1);
    assert!(out.contains("test.describe('Assignment 5 Rubric', () => {"));
    assert!(out.contains(SUMMARY_MARKER));
}

#[test]
fn combine_is_idempotent() {
    let combiner = ChunkCombiner::default();
    let chunks = [chunk(&["a"]), chunk(&["b", "c"])];
    let once = combiner.combine(&chunks);
    assert_eq!(combiner.combine(&[once.clone()]), once);
}

#[test]
fn combined_output_needs_no_repair() {
    let out = ChunkCombiner::default().combine(&[chunk(&["x"]), chunk(&["y"])]);
    let repaired = CodeRepairEngine::default().repair(&out);
    assert!(repaired.diagnostics.balanced);
    assert_eq!(repaired.diagnostics.hook_count, 1);
    assert_eq!(repaired.code.matches("test('").count(), 2);
}
