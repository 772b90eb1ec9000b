//! Merge independently generated chunks into one test module.
//!
//! Output shape: the first chunk's imports, one shared result store, one
//! grouping wrapper holding every registration block in chunk order, and a
//! single finalization hook.

use tracing::debug;

use crate::script::templates::{
    finalization_hook, group_open, indent_lines, DEFAULT_SUITE_TITLE, RESULT_STORE_DECL,
};
use crate::script::{
    find_blocks, indent_of, is_group_start, is_hook_start, is_registration_start,
    is_result_store_decl, scan_lines, split_lines, join_lines, BlockKind,
};

/// Indentation of blocks inside the grouping wrapper.
const GROUP_BODY_INDENT: usize = 2;

/// Merges chunk outputs. Idempotent: combining its own output again yields
/// the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkCombiner {
    suite_title: String,
}

impl Default for ChunkCombiner {
    fn default() -> Self {
        Self::new(DEFAULT_SUITE_TITLE)
    }
}

impl ChunkCombiner {
    pub fn new(suite_title: impl Into<String>) -> Self {
        Self {
            suite_title: suite_title.into(),
        }
    }

    pub fn suite_title(&self) -> &str {
        &self.suite_title
    }

    /// Combine chunk outputs in order.
    pub fn combine<S: AsRef<str>>(&self, chunks: &[S]) -> String {
        let header = chunks
            .first()
            .map(|first| header_lines(first.as_ref()))
            .unwrap_or_default();

        let mut blocks: Vec<Vec<String>> = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let extracted = extract_registration_blocks(chunk.as_ref());
            debug!(chunk = idx + 1, blocks = extracted.len(), "extracted registration blocks");
            blocks.extend(extracted);
        }

        let mut out: Vec<String> = Vec::new();
        if !header.is_empty() {
            out.extend(header);
            out.push(String::new());
        }
        out.push(RESULT_STORE_DECL.to_string());
        out.push(String::new());
        out.push(group_open(&self.suite_title));
        for block in &blocks {
            out.extend(reindent(block, GROUP_BODY_INDENT));
            out.push(String::new());
        }
        out.extend(indent_lines(&finalization_hook(), GROUP_BODY_INDENT));
        out.push("});".to_string());

        join_lines(&out)
    }
}

/// Leading text of a chunk before any registration, group or hook, minus
/// result-store declarations, with trailing blank lines trimmed.
fn header_lines(chunk: &str) -> Vec<String> {
    let mut header: Vec<String> = split_lines(chunk)
        .into_iter()
        .take_while(|line| {
            !is_registration_start(line) && !is_group_start(line) && !is_hook_start(line)
        })
        .filter(|line| !is_result_store_decl(line))
        .collect();

    while header.last().is_some_and(|line| line.trim().is_empty()) {
        header.pop();
    }
    while header.first().is_some_and(|line| line.trim().is_empty()) {
        header.remove(0);
    }
    header
}

/// Every registration block of a chunk, as its own lines.
pub fn extract_registration_blocks(chunk: &str) -> Vec<Vec<String>> {
    let lines = split_lines(chunk);
    let scanned = scan_lines(&lines);
    find_blocks(&lines, &scanned, BlockKind::Registration)
        .into_iter()
        .map(|extent| {
            let mut block: Vec<String> = lines[extent.lines()].to_vec();
            while block.last().is_some_and(|line| line.trim().is_empty()) {
                block.pop();
            }
            block
        })
        .collect()
}

/// Shift a block so its least-indented line sits at `indent`.
fn reindent(block: &[String], indent: usize) -> Vec<String> {
    let min_indent = block
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);

    let stripped: Vec<String> = block
        .iter()
        .map(|line| strip_indent(line, min_indent))
        .collect();
    indent_lines(&stripped, indent)
}

fn strip_indent(line: &str, width: usize) -> String {
    let mut removed = 0;
    let mut rest = line;
    while removed < width {
        match rest.chars().next() {
            Some('\t') => {
                removed += 2;
                rest = &rest[1..];
            }
            Some(c) if c.is_whitespace() => {
                removed += 1;
                rest = &rest[c.len_utf8()..];
            }
            _ => break,
        }
    }
    rest.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::templates::FRAMEWORK_IMPORT;

    const CHUNK_A: &str = "\
import { test, expect } from '@playwright/test';
const testResults = [];

test.describe('Chunk 1', () => {
  test('a', async ({ page }) => {
    try {
      await page.goto('/');
      testResults.push({ criterion: 'a', points: { earned: 1, possible: 1 }, passed: true, details: '' });
    } catch (error) {
      testResults.push({ criterion: 'a', points: { earned: 0, possible: 1 }, passed: false, details: String(error) });
    }
  });

  test.afterAll(async () => {
    console.log(testResults);
  });
});
";

    const CHUNK_B: &str = "\
import { test } from '@playwright/test';

test('b', async ({ page }) => {
  await page.goto('/b');
});
";

    #[test]
    fn test_header_comes_from_first_chunk_only() {
        let out = ChunkCombiner::default().combine(&[CHUNK_A, CHUNK_B]);
        assert_eq!(out.matches(FRAMEWORK_IMPORT).count(), 1);
        assert!(!out.contains("import { test } from"));
        assert_eq!(out.matches("const testResults").count(), 1);
    }

    #[test]
    fn test_blocks_keep_chunk_order_and_single_hook() {
        let out = ChunkCombiner::default().combine(&[CHUNK_A, CHUNK_B]);
        let a = out.find("test('a'").unwrap();
        let b = out.find("test('b'").unwrap();
        assert!(a < b);
        assert_eq!(out.matches("test.afterAll(").count(), 1);
        assert_eq!(out.matches("test.describe(").count(), 1);
        assert!(out.contains("  test('b', async ({ page }) => {\n    await page.goto('/b');\n  });"));
    }

    #[test]
    fn test_combine_is_idempotent() {
        let combiner = ChunkCombiner::new("Assignment 3");
        let once = combiner.combine(&[CHUNK_A, CHUNK_B]);
        let twice = combiner.combine(&[once.as_str()]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input_still_yields_skeleton() {
        let out = ChunkCombiner::default().combine::<&str>(&[]);
        assert!(out.starts_with(RESULT_STORE_DECL));
        assert_eq!(out.matches("test.afterAll(").count(), 1);
    }

    #[test]
    fn test_strip_indent_handles_tabs() {
        assert_eq!(strip_indent("\t\tx", 2), "\tx");
        assert_eq!(strip_indent("    x", 2), "  x");
    }
}
