use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::criteria::CriterionIdentifier;

/// Verdict for a single subject (date, sheet, exam) inside a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassedState {
    #[serde(rename = "PASSED")]
    Passed,
    #[serde(rename = "NOTPASSED")]
    NotPassed,
    #[serde(rename = "IGNORE")]
    Ignore,
}

impl PassedState {
    pub fn from_verdict(passed: bool) -> Self {
        if passed {
            Self::Passed
        } else {
            Self::NotPassed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheinCriteriaUnit {
    Sheet,
    Point,
    Exam,
    Presentation,
    Date,
}

/// Progress on one subject of a criterion, keyed in [`StatusBreakdown::infos`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStatus {
    pub achieved: f64,
    pub total: f64,
    pub no: u32,
    pub unit: ScheinCriteriaUnit,
    pub state: PassedState,
}

/// Verdict and progress of one criterion for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub identifier: CriterionIdentifier,
    pub achieved: f64,
    pub total: f64,
    pub unit: ScheinCriteriaUnit,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub infos: BTreeMap<String, SubjectStatus>,
}

/// `achieved / total >= required`. A non-positive `total` never passes.
pub(crate) fn ratio_reached(achieved: f64, total: f64, required: f64) -> bool {
    if total <= 0.0 {
        return false;
    }
    achieved / total >= required
}

/// Compares `achieved` either as a fraction of `total` or as an absolute count.
pub(crate) fn threshold_reached(
    achieved: f64,
    total: f64,
    required: f64,
    percentage: bool,
) -> bool {
    if percentage {
        ratio_reached(achieved, total, required)
    } else {
        achieved >= required
    }
}
