use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Student;

use super::super::context::EvaluationContext;
use super::super::form::FieldDeclaration;
use super::super::status::{
    ratio_reached, PassedState, ScheinCriteriaUnit, StatusBreakdown, SubjectStatus,
};
use super::{CriteriaError, CriterionBlueprint, CriterionIdentifier};

/// Requires the Schein exams to be passed, either one by one or by their combined points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheinexamCriteria {
    pub pass_all_exams_individually: bool,
    /// Fraction of all exam points needed when exams are not judged individually.
    pub percentage_of_all_points_needed: f64,
}

impl CriterionBlueprint for ScheinexamCriteria {
    const IDENTIFIER: CriterionIdentifier = CriterionIdentifier::Scheinexam;

    fn form_fields() -> Vec<FieldDeclaration> {
        vec![
            FieldDeclaration::string("identifier").ignore(),
            FieldDeclaration::boolean("passAllExamsIndividually"),
            FieldDeclaration::number("percentageOfAllPointsNeeded").percentage(),
        ]
    }
}

impl ScheinexamCriteria {
    /// A course without exams never passes.
    pub(crate) fn check_status(
        &self,
        student: &Student,
        ctx: &EvaluationContext<'_>,
    ) -> Result<StatusBreakdown, CriteriaError> {
        let exams = ctx.scheinexams();
        let mut infos = BTreeMap::new();
        let mut exams_passed = 0u32;
        let mut points_achieved = 0.0;
        let mut points_total = 0.0;

        for exam in exams {
            let achieved = student.exam_result(exam);
            let total = exam.total_points();
            let passed = ratio_reached(achieved, total, exam.percentage_needed);

            if passed {
                exams_passed += 1;
            }
            points_achieved += achieved;
            points_total += total;

            infos.insert(
                exam.id.to_string(),
                SubjectStatus {
                    achieved,
                    total,
                    no: exam.scheinexam_no,
                    unit: ScheinCriteriaUnit::Point,
                    state: PassedState::from_verdict(passed),
                },
            );
        }

        let passed = if self.pass_all_exams_individually {
            !exams.is_empty() && exams_passed as usize == exams.len()
        } else {
            ratio_reached(
                points_achieved,
                points_total,
                self.percentage_of_all_points_needed,
            )
        };

        Ok(StatusBreakdown {
            identifier: CriterionIdentifier::Scheinexam,
            achieved: f64::from(exams_passed),
            total: exams.len() as f64,
            unit: ScheinCriteriaUnit::Exam,
            passed,
            infos,
        })
    }
}
