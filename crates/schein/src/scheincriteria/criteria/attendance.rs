use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::Student;

use super::super::context::EvaluationContext;
use super::super::form::FieldDeclaration;
use super::super::status::{
    threshold_reached, PassedState, ScheinCriteriaUnit, StatusBreakdown, SubjectStatus,
};
use super::{CriteriaError, CriterionBlueprint, CriterionIdentifier};

/// Requires a number (or share) of attended tutorial dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCriteria {
    pub value_needed: f64,
    pub percentage: bool,
}

impl CriterionBlueprint for AttendanceCriteria {
    const IDENTIFIER: CriterionIdentifier = CriterionIdentifier::Attendance;

    fn form_fields() -> Vec<FieldDeclaration> {
        vec![
            FieldDeclaration::string("identifier").ignore(),
            FieldDeclaration::boolean("percentage"),
            FieldDeclaration::number("valueNeeded")
                .min(0.0)
                .possible_percentage("percentage"),
        ]
    }
}

impl AttendanceCriteria {
    /// Only dates scheduled for the student's tutorial are considered, each date once.
    pub(crate) fn check_status(
        &self,
        student: &Student,
        ctx: &EvaluationContext<'_>,
    ) -> Result<StatusBreakdown, CriteriaError> {
        let tutorial = ctx.tutorial_of(student)?;
        let mut infos = BTreeMap::new();
        let mut visited = 0u32;
        let dates: BTreeSet<_> = tutorial.dates.iter().collect();

        for (index, date) in dates.iter().enumerate() {
            let state = match student.attendance_on(date) {
                Some(attendance) if attendance.state.counts_as_attended() => {
                    visited += 1;
                    PassedState::Passed
                }
                Some(_) => PassedState::NotPassed,
                None => PassedState::Ignore,
            };

            infos.insert(
                date.to_string(),
                SubjectStatus {
                    achieved: if state == PassedState::Passed { 1.0 } else { 0.0 },
                    total: 1.0,
                    no: index as u32 + 1,
                    unit: ScheinCriteriaUnit::Date,
                    state,
                },
            );
        }

        let achieved = f64::from(visited);
        let total = dates.len() as f64;

        Ok(StatusBreakdown {
            identifier: CriterionIdentifier::Attendance,
            achieved,
            total,
            unit: ScheinCriteriaUnit::Date,
            passed: threshold_reached(achieved, total, self.value_needed, self.percentage),
            infos,
        })
    }
}
