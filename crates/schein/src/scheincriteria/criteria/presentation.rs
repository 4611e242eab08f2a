use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Student;

use super::super::context::EvaluationContext;
use super::super::form::FieldDeclaration;
use super::super::status::{PassedState, ScheinCriteriaUnit, StatusBreakdown, SubjectStatus};
use super::{CriteriaError, CriterionBlueprint, CriterionIdentifier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationCriteria {
    pub presentations_needed: u32,
}

impl CriterionBlueprint for PresentationCriteria {
    const IDENTIFIER: CriterionIdentifier = CriterionIdentifier::Presentation;

    fn form_fields() -> Vec<FieldDeclaration> {
        vec![
            FieldDeclaration::string("identifier").ignore(),
            FieldDeclaration::number("presentationsNeeded")
                .integer()
                .min(0.0),
        ]
    }
}

impl PresentationCriteria {
    pub(crate) fn check_status(
        &self,
        student: &Student,
        ctx: &EvaluationContext<'_>,
    ) -> Result<StatusBreakdown, CriteriaError> {
        let mut infos = BTreeMap::new();

        for (sheet_id, points) in &student.presentation_points {
            let sheet = ctx.sheet(sheet_id)?;
            let state = if *points > 0.0 {
                PassedState::Passed
            } else {
                PassedState::Ignore
            };

            infos.insert(
                sheet_id.to_string(),
                SubjectStatus {
                    achieved: *points,
                    total: *points,
                    no: sheet.sheet_no,
                    unit: ScheinCriteriaUnit::Presentation,
                    state,
                },
            );
        }

        let achieved = student.total_presentation_points();
        let total = f64::from(self.presentations_needed);

        Ok(StatusBreakdown {
            identifier: CriterionIdentifier::Presentation,
            achieved,
            total,
            unit: ScheinCriteriaUnit::Presentation,
            passed: achieved >= total,
            infos,
        })
    }
}
