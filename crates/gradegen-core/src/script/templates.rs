//! Canonical snippets for generated test modules.
//!
//! Snippet builders return unindented lines; callers pass the indentation
//! of the scope they insert into.

use super::js_string;
use crate::domain::Criterion;
use crate::route::goto_expression;

/// The one framework import every artifact carries.
pub const FRAMEWORK_IMPORT: &str = "import { test, expect } from '@playwright/test';";

/// The one shared result-store declaration.
pub const RESULT_STORE_DECL: &str = "const testResults = [];";

/// Route constants resolved by course-scoped routes, as `(name, declaration)`.
pub const ROUTE_CONSTANTS: &[(&str, &str)] = &[
    (
        "COURSE_ID",
        "const COURSE_ID = process.env.COURSE_ID || 'RS101';",
    ),
    (
        "ASSIGNMENT_ID",
        "const ASSIGNMENT_ID = process.env.ASSIGNMENT_ID || 'A101';",
    ),
];

/// Title of the grouping wrapper when none is supplied.
pub const DEFAULT_SUITE_TITLE: &str = "Rubric Tests";

/// Prefix of the summary line the finalization hook prints.
pub const SUMMARY_MARKER: &str = "RUBRIC_RESULTS:";

/// Prefix every line with `indent` spaces; blank lines stay empty.
pub fn indent_lines<S: AsRef<str>>(lines: &[S], indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect()
}

/// Opening line of the grouping wrapper.
pub fn group_open(title: &str) -> String {
    format!("test.describe({}, () => {{", js_string(title))
}

/// The canonical finalization hook: aggregates the result store and prints
/// one machine-readable summary line.
pub fn finalization_hook() -> Vec<String> {
    [
        "test.afterAll(async () => {",
        "  const totalEarned = testResults.reduce((sum, r) => sum + r.points.earned, 0);",
        "  const totalPossible = testResults.reduce((sum, r) => sum + r.points.possible, 0);",
        "  const passedCount = testResults.filter((r) => r.passed).length;",
        "  const failedCount = testResults.length - passedCount;",
        "  const summary = { totalEarned, totalPossible, passed: passedCount, failed: failedCount, results: testResults };",
        "  console.log('RUBRIC_RESULTS:' + JSON.stringify(summary));",
        "});",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Generic existence check injected into empty try bodies.
pub fn existence_check() -> Vec<String> {
    vec![
        "const bodyCount = await page.locator('body').count();".to_string(),
        "expect(bodyCount).toBeGreaterThan(0);".to_string(),
    ]
}

/// Success-path recording: award `possible` when the page body rendered.
pub fn success_recording(criterion_literal: &str, possible: f64) -> Vec<String> {
    vec![
        "const repairedBodyCount = await page.locator('body').count();".to_string(),
        format!(
            "testResults.push({{ criterion: {c}, points: {{ earned: repairedBodyCount > 0 ? {p} : 0, possible: {p} }}, passed: repairedBodyCount > 0, details: repairedBodyCount > 0 ? 'Page body rendered' : 'Page body missing' }});",
            c = criterion_literal,
            p = possible
        ),
    ]
}

/// Failure-path recording used inside `catch (error)`.
pub fn failure_recording(criterion_literal: &str, possible: f64) -> String {
    format!(
        "testResults.push({{ criterion: {c}, points: {{ earned: 0, possible: {p} }}, passed: false, details: String(error) }});",
        c = criterion_literal,
        p = possible
    )
}

/// A complete `try { ... } catch (error) { ... }` recording scaffold.
pub fn recording_scaffold(criterion_literal: &str, possible: f64) -> Vec<String> {
    let mut out = vec!["try {".to_string()];
    out.extend(indent_lines(&success_recording(criterion_literal, possible), 2));
    out.push("} catch (error) {".to_string());
    out.push(format!("  {}", failure_recording(criterion_literal, possible)));
    out.push("}".to_string());
    out
}

/// Minimal but structurally complete scaffold for one criterion:
/// navigate, check that the page body exists, award full points if so.
pub fn placeholder_test(criterion: &Criterion) -> Vec<String> {
    let title = js_string(&criterion.original_text);
    let possible = criterion.points.best;
    vec![
        format!("test({}, async ({{ page }}) => {{", title),
        "  try {".to_string(),
        format!("    await page.goto({});", goto_expression(&criterion.route)),
        "    const bodyCount = await page.locator('body').count();".to_string(),
        "    const passed = bodyCount > 0;".to_string(),
        format!(
            "    testResults.push({{ criterion: {t}, points: {{ earned: passed ? {p} : 0, possible: {p} }}, passed, details: passed ? 'Page body rendered' : 'Page body missing' }});",
            t = title,
            p = possible
        ),
        "  } catch (error) {".to_string(),
        format!("    {}", failure_recording(&title, possible)),
        "  }".to_string(),
        "});".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::domain::PointScale;
    use crate::script::{brace_counts, is_hook_start, is_recording_call, is_registration_start};

    #[test]
    fn test_hook_is_balanced_and_reads_store() {
        let hook = finalization_hook();
        assert!(is_hook_start(&hook[0]));
        assert!(hook.iter().any(|l| l.contains("testResults")));
        assert!(hook.iter().any(|l| l.contains(SUMMARY_MARKER)));
        let (open, close) = brace_counts(&hook);
        assert_eq!(open, close);
    }

    #[test]
    fn test_placeholder_test_shape() {
        let c = classify(
            "Kambaz - Modules - list renders",
            PointScale::new(4.0, 3.0, 2.0, 0.0),
            1,
        )
        .unwrap();
        let lines = placeholder_test(&c);
        assert!(is_registration_start(&lines[0]));
        assert!(lines[2].contains("`/courses/${COURSE_ID}/modules`"));
        assert_eq!(lines.iter().filter(|l| is_recording_call(l)).count(), 2);
        assert!(lines[5].contains("possible: 4"));
        let (open, close) = brace_counts(&lines);
        assert_eq!(open, close);
    }

    #[test]
    fn test_recording_scaffold_is_balanced() {
        let lines = recording_scaffold("'x'", 2.5);
        assert!(lines.iter().any(|l| l.contains("possible: 2.5")));
        let (open, close) = brace_counts(&lines);
        assert_eq!(open, close);
    }

    #[test]
    fn test_indent_lines_keeps_blanks_empty() {
        assert_eq!(indent_lines(&["a", "", "b"], 2), vec!["  a", "", "  b"]);
    }
}
