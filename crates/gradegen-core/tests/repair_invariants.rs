use gradegen_core::script::templates::{FRAMEWORK_IMPORT, RESULT_STORE_DECL, SUMMARY_MARKER};
use gradegen_core::telemetry::init_test_tracing;
use gradegen_core::{CodeRepairEngine, RawCell, RawRow, RepairOptions, RubricModel};

const HOOK: &str = "\
  test.afterAll(async () => {
    const totalEarned = testResults.reduce((sum, r) => sum + r.points.earned, 0);
    const totalPossible = testResults.reduce((sum, r) => sum + r.points.possible, 0);
    const passedCount = testResults.filter((r) => r.passed).length;
    const failedCount = testResults.length - passedCount;
    const summary = { totalEarned, totalPossible, passed: passedCount, failed: failedCount, results: testResults };
    console.log('RUBRIC_RESULTS:' + JSON.stringify(summary));
  });
";

const PRELUDE: &str = "\
import { test, expect } from '@playwright/test';

const testResults = [];
const COURSE_ID = process.env.COURSE_ID || 'RS101';
const ASSIGNMENT_ID = process.env.ASSIGNMENT_ID || 'A101';

";

const HEADING_TEST: &str = "\
  test('Lab - CSS - Heading is blue', async ({ page }) => {
    try {
      await page.goto('/labs/lab2');
      const color = await page.locator('h1').evaluate((el) => getComputedStyle(el).color);
      testResults.push({ criterion: 'Lab - CSS - Heading is blue', points: { earned: 3, possible: 3 }, passed: true, details: color });
    } catch (error) {
      testResults.push({ criterion: 'Lab - CSS - Heading is blue', points: { earned: 0, possible: 3 }, passed: false, details: String(error) });
    }
  });
";

fn well_formed() -> String {
    format!(
        "{}test.describe('Assignment 2 Rubric', () => {{\n{}\n{}}});\n",
        PRELUDE, HEADING_TEST, HOOK
    )
}

fn repair(code: &str) -> gradegen_core::RepairedArtifact {
    init_test_tracing();
    CodeRepairEngine::default().repair(code)
}

fn assert_structural_invariants(code: &str) {
    assert_eq!(code.matches(FRAMEWORK_IMPORT).count(), 1, "import:\n{}", code);
    assert_eq!(code.matches(RESULT_STORE_DECL).count(), 1, "store:\n{}", code);
    assert_eq!(code.matches("const COURSE_ID =").count(), 1, "COURSE_ID:\n{}", code);
    assert_eq!(code.matches("const ASSIGNMENT_ID =").count(), 1, "ASSIGNMENT_ID:\n{}", code);
    assert_eq!(code.matches("test.afterAll(").count(), 1, "hooks:\n{}", code);
    assert_eq!(code.matches("test.describe(").count(), 1, "groups:\n{}", code);
    assert!(code.contains(SUMMARY_MARKER));
    let import_at = code.find(FRAMEWORK_IMPORT).unwrap();
    let store_at = code.find(RESULT_STORE_DECL).unwrap();
    let group_at = code.find("test.describe(").unwrap();
    assert!(import_at < store_at && store_at < group_at, "order:\n{}", code);
}

fn assert_idempotent(code: &str) {
    let once = repair(code);
    let twice = repair(&once.code);
    assert_eq!(once.code, twice.code);
    assert_eq!(twice.diagnostics.fixes_applied(), 0, "{:#?}", twice.diagnostics);
}

#[test]
fn well_formed_module_is_untouched() {
    let input = well_formed();
    let out = repair(&input);
    assert_eq!(out.code, input);
    assert_eq!(out.diagnostics.fixes_applied(), 0);
    assert!(out.diagnostics.balanced);
    assert_eq!(out.diagnostics.hook_count, 1);
    assert_structural_invariants(&out.code);
}

#[test]
fn bare_test_gets_full_scaffolding() {
    let input = "\
test('Kambaz - Dashboard - shows courses', async ({ page }) => {
  try {
    await page.goto('/dashboard');
    testResults.push({ criterion: 'Kambaz - Dashboard - shows courses', points: { earned: 3, possible: 3 }, passed: true, details: 'ok' });
  } catch (error) {
    testResults.push({ criterion: 'Kambaz - Dashboard - shows courses', points: { earned: 0, possible: 3 }, passed: false, details: String(error) });
  }
});
";
    let out = repair(input);
    assert_structural_invariants(&out.code);
    let d = &out.diagnostics;
    assert!(d.import_inserted && d.result_store_inserted);
    assert_eq!(d.constants_inserted, 2);
    assert_eq!(d.bodies_filled, 1);
    assert!(d.hook_synthesized && d.group_wrapped);
    assert!(d.balanced);

    let check = out.code.find("page.locator('body').count()").unwrap();
    let record = out.code.find("testResults.push").unwrap();
    assert!(check < record);
    assert!(out.code.contains("\n    expect(bodyCount).toBeGreaterThan(0);\n"));
    assert_idempotent(input);
}

#[test]
fn truncated_test_is_closed_with_recording() {
    let input = format!(
        "{}test.describe('Assignment 1 Rubric', () => {{
  test('Lab - Forms - Name field', async ({{ page }}) => {{
    try {{
      await page.goto('/labs/lab1');
      await page.locator('#name').fill('Ada');
{}",
        PRELUDE,
        HEADING_TEST.replace("Lab - CSS - Heading is blue", "Lab - Forms - Email field")
    );

    let rows: Vec<RawRow> = vec![
        vec!["Criteria".into()],
        vec!["".into()],
        vec![RawCell::from("Lab - Forms - Name field"), 4.0.into()],
    ];
    let options = RepairOptions::for_rubric(&RubricModel::build(&rows, 1));
    let out = CodeRepairEngine::new(options).repair(&input);

    assert_structural_invariants(&out.code);
    let d = &out.diagnostics;
    assert_eq!(d.blocks_found, 2);
    assert_eq!(d.blocks_closed, 1);
    assert_eq!(d.recordings_added, 1);
    assert!(d.hook_synthesized && d.group_closed);
    assert!(d.balanced, "{}", out.code);

    assert!(out.code.contains(
        "      await page.locator('#name').fill('Ada');\n      const repairedBodyCount = await page.locator('body').count();\n"
    ));
    assert!(out
        .code
        .contains("points: { earned: repairedBodyCount > 0 ? 4 : 0, possible: 4 }"));
    assert!(out.code.contains(
        "    } catch (error) {\n      testResults.push({ criterion: 'Lab - Forms - Name field', points: { earned: 0, possible: 4 }, passed: false, details: String(error) });\n    }\n  });\n  test('Lab - Forms - Email field'"
    ));
    assert!(out.code.ends_with("  });\n});\n"));
    assert_idempotent(&input);
}

#[test]
fn missing_hook_is_inserted_before_group_close() {
    let input = format!(
        "{}test.describe('Assignment 2 Rubric', () => {{\n{}}});\n",
        PRELUDE, HEADING_TEST
    );
    let out = repair(&input);
    assert_structural_invariants(&out.code);
    assert!(out.diagnostics.hook_synthesized);
    assert!(!out.diagnostics.group_closed);
    assert_eq!(out.code, well_formed());
    assert_idempotent(&input);
}

#[test]
fn three_hooks_collapse_to_one_canonical_hook() {
    let input = format!(
        "{}test.describe('Assignment 2 Rubric', () => {{
{}
  test.afterAll(async () => {{
    console.log('first');
  }});

  test.afterAll(async () => {{
    console.log(testResults.length);
  }});

  test.afterAll(async () => {{
    console.log('third');
  }});
}});
",
        PRELUDE, HEADING_TEST
    );
    let out = repair(&input);
    assert_structural_invariants(&out.code);
    assert_eq!(out.diagnostics.hooks_removed, 2);
    assert!(out.diagnostics.hook_replaced);
    assert!(!out.code.contains("console.log('first')"));
    assert!(!out.code.contains("console.log('third')"));
    assert_eq!(out.code, well_formed());
    assert_idempotent(&input);
}

#[test]
fn duplicate_imports_and_stores_are_collapsed() {
    let input = format!(
        "import {{ test }} from '@playwright/test';
import {{ expect }} from '@playwright/test';
const testResults = [];
const testResults = [];
const COURSE_ID = 'RS101';
const COURSE_ID = 'RS102';

test.describe('Assignment 2 Rubric', () => {{
{}
{}}});
",
        HEADING_TEST, HOOK
    );
    let out = repair(&input);
    assert_structural_invariants(&out.code);
    let d = &out.diagnostics;
    assert_eq!(d.imports_removed, 2);
    assert_eq!(d.result_stores_removed, 2);
    assert_eq!(d.constants_removed, 1);
    assert_eq!(d.constants_inserted, 1);
    assert!(out.code.contains("const COURSE_ID = 'RS101';"));
    assert!(!out.code.contains("RS102"));
    assert_idempotent(&input);
}

#[test]
fn bodiless_registration_fragment_is_dropped() {
    let input = format!(
        "{}test.describe('Assignment 2 Rubric', () => {{\n{}\n  test('Lab - Truncated',\n",
        PRELUDE, HEADING_TEST
    );
    let out = repair(&input);
    assert_eq!(out.diagnostics.fragments_dropped, 1);
    assert!(!out.code.contains("Lab - Truncated"));
    assert_structural_invariants(&out.code);
    assert!(out.diagnostics.balanced);
    assert_idempotent(&input);
}

#[test]
fn braces_inside_strings_do_not_count() {
    let input = format!(
        "{}test.describe('Strings', () => {{
  test('braces in text', async ({{ page }}) => {{
    try {{
      await page.goto(`/courses/${{COURSE_ID}}/home`);
      const text = '}}}} not code {{';
      // }} neither is this
      testResults.push({{ criterion: 'braces in text', points: {{ earned: 1, possible: 1 }}, passed: true, details: text }});
    }} catch (error) {{
      testResults.push({{ criterion: 'braces in text', points: {{ earned: 0, possible: 1 }}, passed: false, details: String(error) }});
    }}
  }});

{}}});
",
        PRELUDE, HOOK
    );
    let out = repair(&input);
    assert_eq!(out.code, input);
    assert!(out.diagnostics.balanced);
}

#[test]
fn text_without_registrations_is_unrecoverable() {
    let input = "Sorry, I cannot help with that.";
    let out = repair(input);
    assert!(out.diagnostics.unrecoverable);
    assert_eq!(out.code, input);
    assert_eq!(out.diagnostics.fixes_applied(), 0);
}

#[test]
fn require_inside_test_body_is_not_treated_as_prelude() {
    let input = format!(
        "{}\n\ntest.describe('Assignment 3 Rubric', () => {{
  test('Lab - Files - reads fixture', async ({{ page }}) => {{
    try {{
      const fs = require('fs');
      await page.goto('/labs/lab3');
      testResults.push({{ criterion: 'Lab - Files - reads fixture', points: {{ earned: 3, possible: 3 }}, passed: true, details: 'ok' }});
    }} catch (error) {{
      testResults.push({{ criterion: 'Lab - Files - reads fixture', points: {{ earned: 0, possible: 3 }}, passed: false, details: String(error) }});
    }}
  }});
}});
",
        FRAMEWORK_IMPORT
    );
    let out = repair(&input);
    assert_structural_invariants(&out.code);
    assert!(out.code.starts_with(&format!(
        "{}\n{}\nconst COURSE_ID =",
        FRAMEWORK_IMPORT, RESULT_STORE_DECL
    )));
    assert!(out
        .code
        .contains("      const fs = require('fs');\n      await page.goto('/labs/lab3');\n"));
    assert!(out.diagnostics.balanced);
    assert_idempotent(&input);
}

#[test]
fn regex_literal_assertions_leave_well_formed_module_untouched() {
    let regex_test = HEADING_TEST.replace(
        "      await page.goto('/labs/lab2');\n",
        concat!(
            "      await page.goto('/labs/lab2');\n",
            r"      await expect(page).toHaveURL(/labs\/*/);",
            "\n"
        ),
    );
    let second = HEADING_TEST.replace("Heading is blue", "Heading is bold");
    let input = format!(
        "{}test.describe('Assignment 2 Rubric', () => {{\n{}\n{}\n{}}});\n",
        PRELUDE, regex_test, second, HOOK
    );
    let out = repair(&input);
    assert_eq!(out.code, input);
    assert_eq!(out.diagnostics.fixes_applied(), 0);
    assert!(out.diagnostics.balanced);
    assert_idempotent(&input);
}

#[test]
fn body_indented_less_than_its_header_is_left_alone() {
    let input = format!(
        "{}test.describe('Assignment 2 Rubric', () => {{
    test('Lab - CSS - Heading is blue', async ({{ page }}) => {{
  try {{
    await page.goto('/labs/lab2');
    const color = await page.locator('h1').evaluate((el) => getComputedStyle(el).color);
    testResults.push({{ criterion: 'Lab - CSS - Heading is blue', points: {{ earned: 3, possible: 3 }}, passed: true, details: color }});
  }} catch (error) {{
    testResults.push({{ criterion: 'Lab - CSS - Heading is blue', points: {{ earned: 0, possible: 3 }}, passed: false, details: String(error) }});
  }}
    }});

{}}});
",
        PRELUDE, HOOK
    );
    let out = repair(&input);
    assert_eq!(out.code, input);
    assert_eq!(out.diagnostics.blocks_closed, 0);
    assert!(out.diagnostics.balanced);
}

#[test]
fn recording_cut_mid_statement_is_replaced() {
    let input = format!(
        "{}test.describe('Assignment 2 Rubric', () => {{
  test('Lab - Forms - Submit', async ({{ page }}) => {{
    try {{
      await page.locator('#submit').click();
      testResults.push({{
        criterion: 'Lab - Forms - Submit',
        points: {{ earned: 1,
",
        PRELUDE
    );
    let out = repair(&input);
    assert_structural_invariants(&out.code);
    let d = &out.diagnostics;
    assert_eq!(d.recordings_dropped, 1);
    assert_eq!(d.recordings_added, 1);
    assert_eq!(d.blocks_closed, 1);
    assert!(d.balanced, "{}", out.code);
    assert_eq!(d.open_parens, d.close_parens);
    assert!(!out.code.contains("points: { earned: 1,"));
    assert!(out.code.contains(
        "      await page.locator('#submit').click();\n      const repairedBodyCount = await page.locator('body').count();\n"
    ));
    assert!(out.code.contains(
        "    } catch (error) {\n      testResults.push({ criterion: 'Lab - Forms - Submit', points: { earned: 0, possible: 3 }, passed: false, details: String(error) });\n    }\n  });\n"
    ));
    assert_idempotent(&input);
}

#[test]
fn every_truncated_top_level_group_is_closed() {
    let input = format!(
        "{}test.describe('Labs', () => {{
{}
{}}});

test.describe('Kambaz', () => {{
  test('Kambaz - Dashboard - shows courses', async ({{ page }}) => {{
    try {{
      await page.goto('/dashboard');
      testResults.push({{ criterion: 'Kambaz - Dashboard - shows courses', points: {{ earned: 3, possible: 3 }}, passed: true, details: 'ok' }});
    }} catch (error) {{
      testResults.push({{ criterion: 'Kambaz - Dashboard - shows courses', points: {{ earned: 0, possible: 3 }}, passed: false, details: String(error) }});
    }}
  }});
",
        PRELUDE, HEADING_TEST, HOOK
    );
    let out = repair(&input);
    let d = &out.diagnostics;
    assert!(d.group_closed);
    assert!(d.balanced, "{}", out.code);
    assert_eq!(d.hook_count, 1);
    assert_eq!(out.code.matches("test.describe(").count(), 2);
    assert!(out.code.ends_with("  });\n});\n"));
    assert_idempotent(&input);
}
