//! Criterion classification.
//!
//! Turns one rubric row into a typed [`Criterion`] using prefix dispatch:
//! `"Lab -"` rows, `"Kambaz -"` rows, and everything else (General).

use crate::domain::{Criterion, CriterionKind, PointScale, TestTypeHint};
use crate::route::{lab_route, resolve_kambaz_route, ROOT_ROUTE};

const LAB_PREFIX: &str = "Lab -";
const KAMBAZ_PREFIX: &str = "Kambaz -";
const SEGMENT_SEPARATOR: &str = " - ";

/// Ordered test-type cascade. First matching row wins.
const TEST_TYPE_RULES: &[(TestTypeHint, &[&str])] = &[
    (
        TestTypeHint::Responsive,
        &["responsive", "viewport", "mobile", "screen size", "breakpoint"],
    ),
    (
        TestTypeHint::StyleCheck,
        &[
            "color", "css", "style", "font", "border", "background", "margin", "padding",
        ],
    ),
    (
        TestTypeHint::FormInput,
        &[
            "input", "form", "field", "textarea", "dropdown", "select", "checkbox", "radio",
        ],
    ),
    (
        TestTypeHint::NavigationClick,
        &["link", "navigat", "click", "button", "redirect"],
    ),
    (
        TestTypeHint::LayoutCount,
        &["list", "table", "grid", "count", "layout", "flex", "column", "row"],
    ),
    (
        TestTypeHint::ContentPresence,
        &["heading", "title", "text", "image", "display", "shows"],
    ),
];

/// Classify one rubric row.
///
/// Returns `None` when the text is blank or when a prefixed row is malformed;
/// the caller skips such rows.
pub fn classify(row_text: &str, points: PointScale, assignment_number: u32) -> Option<Criterion> {
    let text = row_text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(rest) = text.strip_prefix(LAB_PREFIX) {
        parse_lab(text, rest, points, assignment_number)
    } else if let Some(rest) = text.strip_prefix(KAMBAZ_PREFIX) {
        parse_kambaz(text, rest, points)
    } else {
        Some(parse_general(text, points))
    }
}

fn split_segments(rest: &str) -> Vec<&str> {
    rest.trim()
        .split(SEGMENT_SEPARATOR)
        .map(str::trim)
        .collect()
}

fn parse_lab(text: &str, rest: &str, points: PointScale, assignment_number: u32) -> Option<Criterion> {
    let segments = split_segments(rest);
    let category = segments.first().copied().filter(|s| !s.is_empty())?;
    let detail = segments[1..].join(SEGMENT_SEPARATOR);

    Some(Criterion {
        kind: CriterionKind::Lab,
        original_text: text.to_string(),
        route: lab_route(assignment_number),
        points,
        category: Some(category.to_string()),
        section: None,
        subsection: None,
        test_type_hint: derive_test_type(&detail, Some(category)),
        detail,
    })
}

fn parse_kambaz(text: &str, rest: &str, points: PointScale) -> Option<Criterion> {
    let segments = split_segments(rest);
    let section = segments.first().copied().filter(|s| !s.is_empty())?;
    let subsection = segments.get(1).copied().filter(|s| !s.is_empty());
    let detail = segments.get(2..).map(|d| d.join(SEGMENT_SEPARATOR)).unwrap_or_default();

    Some(Criterion {
        kind: CriterionKind::Kambaz,
        original_text: text.to_string(),
        route: resolve_kambaz_route(section, subsection),
        points,
        category: None,
        section: Some(section.to_string()),
        subsection: subsection.map(str::to_string),
        test_type_hint: derive_test_type(&detail, subsection),
        detail,
    })
}

fn parse_general(text: &str, points: PointScale) -> Criterion {
    Criterion {
        kind: CriterionKind::General,
        original_text: text.to_string(),
        route: ROOT_ROUTE.to_string(),
        points,
        category: Some("General".to_string()),
        section: None,
        subsection: None,
        detail: text.to_string(),
        test_type_hint: derive_test_type(text, None),
    }
}

/// Derive the test-type hint from the detail text, then the category text.
pub fn derive_test_type(detail: &str, category: Option<&str>) -> TestTypeHint {
    let candidates = [Some(detail), category];
    for text in candidates.into_iter().flatten() {
        let lowered = text.to_lowercase();
        if lowered.is_empty() {
            continue;
        }
        for (hint, needles) in TEST_TYPE_RULES {
            if needles.iter().any(|needle| lowered.contains(needle)) {
                return *hint;
            }
        }
    }
    TestTypeHint::Generic
}
