//! The `Criterion` record: one gradable rubric line item.

use serde::{Deserialize, Serialize};

/// Which rubric family a criterion was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    General,
    Lab,
    Kambaz,
}

impl CriterionKind {
    /// Heading used when criteria are grouped by kind.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Lab => "Lab",
            Self::Kambaz => "Kambaz",
            Self::General => "General",
        }
    }
}

/// Four-tier point scale read from the rubric spreadsheet.
///
/// `best >= better >= almost >= missing` is expected but never enforced;
/// defective scales pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointScale {
    pub best: f64,
    pub better: f64,
    pub almost: f64,
    pub missing: f64,
}

impl Default for PointScale {
    fn default() -> Self {
        Self {
            best: 3.0,
            better: 2.0,
            almost: 1.0,
            missing: 0.0,
        }
    }
}

impl PointScale {
    pub fn new(best: f64, better: f64, almost: f64, missing: f64) -> Self {
        Self {
            best,
            better,
            almost,
            missing,
        }
    }

    /// Returns `true` when the tiers are non-increasing from best to missing.
    pub fn is_monotonic(&self) -> bool {
        self.best >= self.better && self.better >= self.almost && self.almost >= self.missing
    }
}

/// Coarse hint steering how the generator should phrase a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestTypeHint {
    Responsive,
    StyleCheck,
    FormInput,
    NavigationClick,
    LayoutCount,
    ContentPresence,
    Generic,
}

impl TestTypeHint {
    /// Stable label used in prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Responsive => "responsive",
            Self::StyleCheck => "style_check",
            Self::FormInput => "form_input",
            Self::NavigationClick => "navigation_click",
            Self::LayoutCount => "layout_count",
            Self::ContentPresence => "content_presence",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for TestTypeHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One gradable rubric line item with routing and scoring metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub kind: CriterionKind,
    /// Verbatim rubric text; doubles as the test title.
    pub original_text: String,
    /// Route template, never empty. May contain `:courseId` / `:assignmentId`.
    pub route: String,
    pub points: PointScale,
    pub category: Option<String>,
    pub section: Option<String>,
    pub subsection: Option<String>,
    pub detail: String,
    pub test_type_hint: TestTypeHint,
}

impl Criterion {
    /// Human-readable section label used for `RubricModel::sections`.
    pub fn section_label(&self) -> String {
        match self.kind {
            CriterionKind::Lab => "Labs".to_string(),
            CriterionKind::Kambaz => {
                format!("Kambaz - {}", self.section.as_deref().unwrap_or_default())
            }
            CriterionKind::General => "General".to_string(),
        }
    }
}
