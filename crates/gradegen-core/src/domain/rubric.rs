//! `RubricModel`: the classified, ordered criteria of one assignment rubric.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::criterion::{Criterion, PointScale};
use super::error::{GradegenError, Result};
use crate::classify::classify;

/// Leading rows of the spreadsheet: the label row and the tier-label row.
pub const HEADER_ROWS: usize = 2;

/// Assignment number used when none (or zero) is supplied.
pub const DEFAULT_ASSIGNMENT_NUMBER: u32 = 1;

/// One spreadsheet cell as handed over by the tabular reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Empty,
}

impl RawCell {
    /// Cell contents as display text.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Empty => String::new(),
        }
    }

    /// Numeric value, accepting numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Empty => None,
        }
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One spreadsheet row: `[text, best, better, almost, missing]`.
pub type RawRow = Vec<RawCell>;

/// Classified criteria for one assignment, in source row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RubricModel {
    criteria: Vec<Criterion>,
    assignment_number: u32,
    total_points: f64,
    sections: BTreeSet<String>,
}

impl RubricModel {
    /// Build the model from raw rows, skipping the two header rows.
    ///
    /// Rows with a blank first cell, and rows the classifier rejects, are
    /// skipped and do not contribute to `total_points`.
    pub fn build(rows: &[RawRow], assignment_number: u32) -> Self {
        let assignment_number = if assignment_number == 0 {
            warn!(
                default = DEFAULT_ASSIGNMENT_NUMBER,
                "assignment number 0 is not valid; using default"
            );
            DEFAULT_ASSIGNMENT_NUMBER
        } else {
            assignment_number
        };

        let mut criteria = Vec::new();
        let mut total_points = 0.0;

        for (idx, row) in rows.iter().enumerate().skip(HEADER_ROWS) {
            let text = row.first().map(RawCell::as_text).unwrap_or_default();
            if text.trim().is_empty() {
                continue;
            }

            let points = point_scale(row);
            if !points.is_monotonic() {
                warn!(row = idx, text = %text, ?points, "non-monotonic point scale accepted as-is");
            }

            match classify(&text, points, assignment_number) {
                Some(criterion) => {
                    total_points += criterion.points.best;
                    criteria.push(criterion);
                }
                None => debug!(row = idx, text = %text, "skipping unclassifiable rubric row"),
            }
        }

        let sections = criteria.iter().map(Criterion::section_label).collect();

        Self {
            criteria,
            assignment_number,
            total_points,
            sections,
        }
    }

    /// Build from a JSON array of rows, e.g. `[["Lab - Forms - Name", 3, 2, 1, 0]]`.
    pub fn from_json(json: &str, assignment_number: u32) -> Result<Self> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                if !value.is_array() {
                    return Err(GradegenError::InvalidRow {
                        row,
                        reason: "expected an array of cells".to_string(),
                    });
                }
                Ok(serde_json::from_value::<RawRow>(value)?)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::build(&rows, assignment_number))
    }

    /// Validate a caller-supplied assignment number before building.
    pub fn checked_assignment_number(value: i64) -> Result<u32> {
        u32::try_from(value)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(GradegenError::InvalidAssignmentNumber(value))
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn assignment_number(&self) -> u32 {
        self.assignment_number
    }

    pub fn total_points(&self) -> f64 {
        self.total_points
    }

    pub fn sections(&self) -> &BTreeSet<String> {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

fn point_scale(row: &[RawCell]) -> PointScale {
    let defaults = PointScale::default();
    let cell = |idx: usize, fallback: f64| {
        row.get(idx)
            .and_then(RawCell::as_number)
            .unwrap_or(fallback)
    };

    PointScale {
        best: cell(1, defaults.best),
        better: cell(2, defaults.better),
        almost: cell(3, defaults.almost),
        missing: cell(4, defaults.missing),
    }
}
