use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::model::{Student, StudentId};

use super::context::EvaluationContext;
use super::criteria::{CriterionId, CriterionIdentifier, CriterionRecord};
use super::status::StatusBreakdown;

/// Why a criterion could not be evaluated for a student. Counts as not passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationFailure {
    pub identifier: CriterionIdentifier,
    pub passed: bool,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CriterionOutcome {
    Evaluated(StatusBreakdown),
    Failed(EvaluationFailure),
}

/// Entry of [`ScheinCriteriaSummary::scheincriteria_summary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionStatus {
    pub id: CriterionId,
    pub name: String,
    #[serde(flatten)]
    pub outcome: CriterionOutcome,
}

impl CriterionStatus {
    pub fn passed(&self) -> bool {
        match &self.outcome {
            CriterionOutcome::Evaluated(breakdown) => breakdown.passed,
            CriterionOutcome::Failed(_) => false,
        }
    }

    pub fn breakdown(&self) -> Option<&StatusBreakdown> {
        match &self.outcome {
            CriterionOutcome::Evaluated(breakdown) => Some(breakdown),
            CriterionOutcome::Failed(_) => None,
        }
    }
}

/// Verdict of all criteria for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheinCriteriaSummary {
    pub passed: bool,
    #[serde(rename = "scheinCriteriaSummary")]
    pub scheincriteria_summary: BTreeMap<CriterionId, CriterionStatus>,
}

/// How all students fare on a single criterion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaInformation {
    pub id: CriterionId,
    pub name: String,
    pub identifier: CriterionIdentifier,
    pub passed: u32,
    pub not_passed: u32,
    /// Students the criterion could not be evaluated for. Also counted in `not_passed`.
    pub failed: u32,
    /// Number of students per achieved value.
    pub distribution: BTreeMap<String, u32>,
}

/// Runs every stored criterion against students. Holds no state besides the criteria.
pub struct SummaryEngine<'a> {
    criteria: &'a [CriterionRecord],
}

impl<'a> SummaryEngine<'a> {
    pub fn new(criteria: &'a [CriterionRecord]) -> Self {
        Self { criteria }
    }

    /// Every criterion is evaluated even after one has failed. A student passes only if all do.
    pub fn summarize(
        &self,
        student: &Student,
        ctx: &EvaluationContext<'_>,
    ) -> ScheinCriteriaSummary {
        let mut scheincriteria_summary = BTreeMap::new();

        for record in self.criteria {
            let status = evaluate(record, student, ctx);
            scheincriteria_summary.insert(record.id, status);
        }

        ScheinCriteriaSummary {
            passed: scheincriteria_summary.values().all(CriterionStatus::passed),
            scheincriteria_summary,
        }
    }

    pub fn summarize_many<'s, I>(
        &self,
        students: I,
        ctx: &EvaluationContext<'_>,
    ) -> BTreeMap<StudentId, ScheinCriteriaSummary>
    where
        I: IntoIterator<Item = &'s Student>,
    {
        students
            .into_iter()
            .map(|student| (student.id, self.summarize(student, ctx)))
            .collect()
    }
}

fn evaluate(
    record: &CriterionRecord,
    student: &Student,
    ctx: &EvaluationContext<'_>,
) -> CriterionStatus {
    let outcome = match record.criterion.status_breakdown(student, ctx) {
        Ok(breakdown) => CriterionOutcome::Evaluated(breakdown),
        Err(error) => {
            warn!(
                criterion = %record.id,
                student = %student.id,
                %error,
                "criterion could not be evaluated"
            );
            CriterionOutcome::Failed(EvaluationFailure {
                identifier: record.identifier(),
                passed: false,
                error: error.to_string(),
            })
        }
    };

    CriterionStatus {
        id: record.id,
        name: record.name.clone(),
        outcome,
    }
}

/// Aggregates one criterion over `students`.
pub fn criteria_information<'s, I>(
    record: &CriterionRecord,
    students: I,
    ctx: &EvaluationContext<'_>,
) -> CriteriaInformation
where
    I: IntoIterator<Item = &'s Student>,
{
    let mut information = CriteriaInformation {
        id: record.id,
        name: record.name.clone(),
        identifier: record.identifier(),
        passed: 0,
        not_passed: 0,
        failed: 0,
        distribution: BTreeMap::new(),
    };

    for student in students {
        let status = evaluate(record, student, ctx);
        match status.breakdown() {
            Some(breakdown) => {
                *information
                    .distribution
                    .entry(breakdown.achieved.to_string())
                    .or_insert(0) += 1;
                if breakdown.passed {
                    information.passed += 1;
                } else {
                    information.not_passed += 1;
                }
            }
            None => {
                information.failed += 1;
                information.not_passed += 1;
            }
        }
    }

    information
}
