//! Day score engine for the habit tracker.
//!
//! Turns raw per-category inputs into a bounded total and a three-tier
//! classification. Category sets and classification thresholds are
//! configuration, not hard-coded business rules: the two historical revisions
//! of the app (0-10 sliders at cuts 20/10, checklist-derived 0/5/10 at cuts
//! 21/15) are both presets of [`ScoringPolicy`].
//!
//! Everything here is a pure function. The engine never talks to the
//! persistence collaborator.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use shared::ScoreTier;
use std::collections::BTreeMap;

/// Upper bound for any single category sub-score
pub const SUB_SCORE_MAX: u32 = 10;

/// How a category's sub-score is entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CategoryInput {
    /// Free-form 0-10 slider
    Slider,
    /// Boolean sub-items, each worth a fixed point value. The sub-score is
    /// the sum of the checked items' values.
    Checklist { item_points: Vec<u32> },
}

/// One tracked habit dimension contributing a sub-score to the daily total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Stable key used in stored records (e.g. "teeth")
    pub key: String,
    /// Human-readable label for presentation
    pub label: String,
    pub input: CategoryInput,
}

/// Versioned scoring configuration: the category set plus the two
/// classification cuts.
///
/// Contract: `classify(t) = Top if t > high_cut; Ok if t > low_cut; else Oops`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub categories: Vec<CategorySpec>,
    /// Totals strictly above this are Top
    pub high_cut: u32,
    /// Totals strictly above this (but not above `high_cut`) are Ok
    pub low_cut: u32,
}

impl ScoringPolicy {
    /// First revision: sleep/food/sport 0-10 sliders, cuts 20/10 over 0-30
    pub fn slider_v1() -> Self {
        Self {
            categories: vec![
                CategorySpec {
                    key: "sleep".to_string(),
                    label: "Sleep".to_string(),
                    input: CategoryInput::Slider,
                },
                CategorySpec {
                    key: "food".to_string(),
                    label: "Diet".to_string(),
                    input: CategoryInput::Slider,
                },
                CategorySpec {
                    key: "sport".to_string(),
                    label: "Exercise".to_string(),
                    input: CategoryInput::Slider,
                },
            ],
            high_cut: 20,
            low_cut: 10,
        }
    }

    /// Second revision: teeth/food/sport checklists of two 5-point items,
    /// cuts tightened to 21/15
    pub fn checklist_v2() -> Self {
        let checklist = CategoryInput::Checklist {
            item_points: vec![5, 5],
        };
        Self {
            categories: vec![
                CategorySpec {
                    key: "teeth".to_string(),
                    label: "Oral care".to_string(),
                    input: checklist.clone(),
                },
                CategorySpec {
                    key: "food".to_string(),
                    label: "Diet".to_string(),
                    input: checklist.clone(),
                },
                CategorySpec {
                    key: "sport".to_string(),
                    label: "Exercise".to_string(),
                    input: checklist,
                },
            ],
            high_cut: 21,
            low_cut: 15,
        }
    }

    /// Maximum reachable daily total under this policy
    pub fn max_total(&self) -> u32 {
        SUB_SCORE_MAX * self.categories.len() as u32
    }

    /// Apply the two threshold cuts. Total function: every total maps to
    /// exactly one tier, with no gaps or overlaps at the boundaries.
    pub fn classify(&self, total: u32) -> ScoreTier {
        if total > self.high_cut {
            ScoreTier::Top
        } else if total > self.low_cut {
            ScoreTier::Ok
        } else {
            ScoreTier::Oops
        }
    }

    pub fn category(&self, key: &str) -> Option<&CategorySpec> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Validate a score mapping against this policy before any record is
    /// constructed: every key must be a known category, every value within
    /// range, and checklist-backed values representable by the item points.
    pub fn validate_scores(&self, scores: &BTreeMap<String, u32>) -> AppResult<()> {
        for (key, value) in scores {
            let spec = self.category(key).ok_or_else(|| {
                AppError::validation(format!("unknown category '{}'", key))
            })?;
            if *value > SUB_SCORE_MAX {
                return Err(AppError::validation(format!(
                    "score {} for '{}' is out of range 0-{}",
                    value, key, SUB_SCORE_MAX
                )));
            }
            if let CategoryInput::Checklist { item_points } = &spec.input {
                // Surfaces stored scores that no checklist state can produce
                checklist_from_score(item_points, *value)?;
            }
        }
        Ok(())
    }
}

/// Sum of all category sub-scores. Order-invariant; no clamping, since each
/// input is already range-constrained by its own control.
pub fn compute_total(scores: &BTreeMap<String, u32>) -> u32 {
    scores.values().sum()
}

/// Map a stored sub-score back to checklist state for display.
///
/// Items are consumed first-to-last: a score of 10 over two 5-point items
/// checks both, 5 checks only the first, 0 checks nothing. A score the item
/// values cannot produce is a validation error, not something to repair.
pub fn checklist_from_score(item_points: &[u32], score: u32) -> AppResult<Vec<bool>> {
    let mut remaining = score;
    let mut checked = Vec::with_capacity(item_points.len());
    for points in item_points {
        if remaining >= *points {
            checked.push(true);
            remaining -= points;
        } else {
            checked.push(false);
        }
    }
    if remaining != 0 {
        return Err(AppError::validation(format!(
            "score {} is not representable by checklist items {:?}",
            score, item_points
        )));
    }
    Ok(checked)
}

/// Map checklist state to the sub-score persisted for the category
pub fn score_from_checklist(item_points: &[u32], checked: &[bool]) -> u32 {
    item_points
        .iter()
        .zip(checked)
        .filter(|(_, on)| **on)
        .map(|(points, _)| *points)
        .sum()
}
