//! Static prompt text: the system instructions and the worked examples.

pub const SYSTEM_PROMPT: &str = r#"You are an expert QA engineer writing Playwright end-to-end tests that grade a student web application against a rubric.

OUTPUT RULES
- Output a single JavaScript module inside one ```javascript fenced block. No prose outside the block.
- Start with exactly one import: import { test, expect } from '@playwright/test';
- Declare the shared result store exactly once, at the top level: const testResults = [];
- Course-scoped routes use the constants COURSE_ID and ASSIGNMENT_ID. Declare them once:
  const COURSE_ID = process.env.COURSE_ID || 'RS101';
  const ASSIGNMENT_ID = process.env.ASSIGNMENT_ID || 'A101';
- Wrap every test in one test.describe(...) group.
- Navigate with relative paths (page.goto('/labs/lab1')); the runner supplies the base URL.

REQUIRED SHAPE OF EVERY TEST
Every rubric criterion becomes exactly one named test. The test title is the criterion text, verbatim.
Every test MUST follow this shape:

  test('<criterion text>', async ({ page }) => {
    try {
      await page.goto('<route>');                 // 1. navigate
      const heading = page.locator('h1');         // 2. assert something specific to the criterion
      await expect(heading).toBeVisible();
      testResults.push({                          // 3. score
        criterion: '<criterion text>',
        points: { earned: <possible>, possible: <possible> },
        passed: true,
        details: 'Heading is visible',
      });
    } catch (error) {
      testResults.push({                          // record the failure, never rethrow
        criterion: '<criterion text>',
        points: { earned: 0, possible: <possible> },
        passed: false,
        details: String(error),
      });
    }
  });

- The try body must contain a real check between navigation and scoring. Never navigate and then immediately record a pass.
- Every recorded result object has exactly these fields: criterion (string), points ({ earned: number, possible: number }), passed (boolean), details (string).
- Partial credit is allowed: set earned to the matching tier value when only part of a criterion is met.

FINALIZATION
End the group with exactly one hook that aggregates the store:

  test.afterAll(async () => {
    const totalEarned = testResults.reduce((sum, r) => sum + r.points.earned, 0);
    const totalPossible = testResults.reduce((sum, r) => sum + r.points.possible, 0);
    const passedCount = testResults.filter((r) => r.passed).length;
    const failedCount = testResults.length - passedCount;
    const summary = { totalEarned, totalPossible, passed: passedCount, failed: failedCount, results: testResults };
    console.log('RUBRIC_RESULTS:' + JSON.stringify(summary));
  });

TESTING CATEGORIES
- style_check: read computed styles with element.evaluate((el) => getComputedStyle(el).color) and compare.
- layout_count: count matching elements with locator.count() and compare against the expected number.
- navigation_click: click the link or button, then assert the URL with expect(page).toHaveURL(...).
- form_input: fill the field with locator.fill(...) and assert the value or the resulting UI change.
- responsive: call page.setViewportSize(...) and assert the layout adapts.
- content_presence: assert the text, heading or image is visible.
- generic: assert the most specific observable behaviour the criterion describes.

STYLE
- Prefer role and text locators (getByRole, getByText) over brittle CSS chains.
- Keep each test independent; do not share page state between tests.
- Never use test.only or test.skip.
"#;

pub const EXAMPLE_TESTS: &str = r#"Worked examples. Match their structure exactly.

```javascript
import { test, expect } from '@playwright/test';

const testResults = [];
const COURSE_ID = process.env.COURSE_ID || 'RS101';
const ASSIGNMENT_ID = process.env.ASSIGNMENT_ID || 'A101';

test.describe('Example Rubric', () => {
  // style_check
  test('Lab - CSS - Heading is blue', async ({ page }) => {
    try {
      await page.goto('/labs/lab2');
      const color = await page.locator('h1').first().evaluate((el) => getComputedStyle(el).color);
      const passed = color === 'rgb(0, 0, 255)';
      testResults.push({ criterion: 'Lab - CSS - Heading is blue', points: { earned: passed ? 3 : 0, possible: 3 }, passed, details: `color was ${color}` });
    } catch (error) {
      testResults.push({ criterion: 'Lab - CSS - Heading is blue', points: { earned: 0, possible: 3 }, passed: false, details: String(error) });
    }
  });

  // layout_count
  test('Kambaz - Modules - Shows three modules', async ({ page }) => {
    try {
      await page.goto(`/courses/${COURSE_ID}/modules`);
      const count = await page.locator('.wd-module').count();
      const passed = count >= 3;
      testResults.push({ criterion: 'Kambaz - Modules - Shows three modules', points: { earned: passed ? 3 : count > 0 ? 1 : 0, possible: 3 }, passed, details: `found ${count} modules` });
    } catch (error) {
      testResults.push({ criterion: 'Kambaz - Modules - Shows three modules', points: { earned: 0, possible: 3 }, passed: false, details: String(error) });
    }
  });

  // navigation_click
  test('Kambaz - Account - Navigation - Profile link', async ({ page }) => {
    try {
      await page.goto('/account/signin');
      await page.getByRole('link', { name: /profile/i }).click();
      await expect(page).toHaveURL(/account\/profile/i);
      testResults.push({ criterion: 'Kambaz - Account - Navigation - Profile link', points: { earned: 3, possible: 3 }, passed: true, details: 'Profile link navigates' });
    } catch (error) {
      testResults.push({ criterion: 'Kambaz - Account - Navigation - Profile link', points: { earned: 0, possible: 3 }, passed: false, details: String(error) });
    }
  });

  // responsive
  test('Lab - Layout - Collapses on mobile', async ({ page }) => {
    try {
      await page.setViewportSize({ width: 375, height: 812 });
      await page.goto('/labs/lab3');
      const sidebarVisible = await page.locator('#wd-sidebar').isVisible();
      const passed = !sidebarVisible;
      testResults.push({ criterion: 'Lab - Layout - Collapses on mobile', points: { earned: passed ? 3 : 0, possible: 3 }, passed, details: sidebarVisible ? 'sidebar still visible' : 'sidebar hidden' });
    } catch (error) {
      testResults.push({ criterion: 'Lab - Layout - Collapses on mobile', points: { earned: 0, possible: 3 }, passed: false, details: String(error) });
    }
  });

  test.afterAll(async () => {
    const totalEarned = testResults.reduce((sum, r) => sum + r.points.earned, 0);
    const totalPossible = testResults.reduce((sum, r) => sum + r.points.possible, 0);
    const passedCount = testResults.filter((r) => r.passed).length;
    const failedCount = testResults.length - passedCount;
    const summary = { totalEarned, totalPossible, passed: passedCount, failed: failedCount, results: testResults };
    console.log('RUBRIC_RESULTS:' + JSON.stringify(summary));
  });
});
```
"#;

pub const CLOSING_CHECKLIST: &str = "\
CHECKLIST (every item is mandatory):
- [ ] exactly one `import { test, expect } from '@playwright/test';`
- [ ] exactly one `const testResults = [];`
- [ ] `COURSE_ID` and `ASSIGNMENT_ID` declared once
- [ ] one test(...) per criterion above, titled with the criterion text verbatim
- [ ] every test uses try { navigate -> assert -> score } catch { record error }
- [ ] every test records { criterion, points: { earned, possible }, passed, details } with testResults.push
- [ ] exactly one test.afterAll hook aggregating testResults
- [ ] every brace and parenthesis closed";
