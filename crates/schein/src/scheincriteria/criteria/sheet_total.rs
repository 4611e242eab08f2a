use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Student;

use super::super::context::EvaluationContext;
use super::super::form::FieldDeclaration;
use super::super::status::{
    threshold_reached, PassedState, ScheinCriteriaUnit, StatusBreakdown, SubjectStatus,
};
use super::{CriteriaError, CriterionBlueprint, CriterionIdentifier};

/// Requires a number (or share) of points summed over all sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTotalCriteria {
    pub value_needed: f64,
    pub percentage: bool,
}

impl CriterionBlueprint for SheetTotalCriteria {
    const IDENTIFIER: CriterionIdentifier = CriterionIdentifier::SheetTotal;

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

impl SheetTotalCriteria {
    /// Details hold running totals in sheet order. Bonus sheets add to the achieved points only.
    pub(crate) fn check_status(
        &self,
        student: &Student,
        ctx: &EvaluationContext<'_>,
    ) -> Result<StatusBreakdown, CriteriaError> {
        let team = ctx.team_of(student)?;
        let mut sheets: Vec<_> = ctx.sheets().iter().collect();
        sheets.sort_by_key(|sheet| sheet.sheet_no);

        let mut infos = BTreeMap::new();
        let mut achieved = 0.0;
        let mut total = 0.0;

        for sheet in sheets {
            achieved += student.points_on_sheet(team, sheet);
            if !sheet.bonus_sheet {
                total += sheet.max_points();
            }

            let reached = threshold_reached(achieved, total, self.value_needed, self.percentage);
            infos.insert(
                sheet.id.to_string(),
                SubjectStatus {
                    achieved,
                    total,
                    no: sheet.sheet_no,
                    unit: ScheinCriteriaUnit::Point,
                    state: PassedState::from_verdict(reached),
                },
            );
        }

        Ok(StatusBreakdown {
            identifier: CriterionIdentifier::SheetTotal,
            achieved,
            total,
            unit: ScheinCriteriaUnit::Point,
            passed: threshold_reached(achieved, total, self.value_needed, self.percentage),
            infos,
        })
    }
}
