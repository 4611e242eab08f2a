use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Student;

use super::super::context::EvaluationContext;
use super::super::form::FieldDeclaration;
use super::super::status::{
    threshold_reached, PassedState, ScheinCriteriaUnit, StatusBreakdown, SubjectStatus,
};
use super::{CriteriaError, CriterionBlueprint, CriterionIdentifier};

/// Requires a number (or share) of sheets that each reach a per-sheet threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetIndividualCriteria {
    pub value_needed: f64,
    pub percentage: bool,
    pub value_per_sheet_needed: f64,
    pub percentage_per_sheet: bool,
}

impl CriterionBlueprint for SheetIndividualCriteria {
    const IDENTIFIER: CriterionIdentifier = CriterionIdentifier::SheetIndividual;

    fn form_fields() -> Vec<FieldDeclaration> {
        vec![
            FieldDeclaration::string("identifier").ignore(),
            FieldDeclaration::boolean("percentage"),
            FieldDeclaration::number("valueNeeded")
                .min(0.0)
                .possible_percentage("percentage"),
            FieldDeclaration::boolean("percentagePerSheet"),
            FieldDeclaration::number("valuePerSheetNeeded")
                .min(0.0)
                .possible_percentage("percentagePerSheet"),
        ]
    }
}

impl SheetIndividualCriteria {
    /// Bonus sheets can be passed but do not add to the number of existing sheets.
    pub(crate) fn check_status(
        &self,
        student: &Student,
        ctx: &EvaluationContext<'_>,
    ) -> Result<StatusBreakdown, CriteriaError> {
        let team = ctx.team_of(student)?;
        let sheets = ctx.sheets();
        let mut infos = BTreeMap::new();
        let mut sheets_passed = 0u32;

        for sheet in sheets {
            let achieved = student.points_on_sheet(team, sheet);
            let total = if sheet.bonus_sheet {
                sheet.max_points_with_bonus()
            } else {
                sheet.max_points()
            };
            let passed = threshold_reached(
                achieved,
                total,
                self.value_per_sheet_needed,
                self.percentage_per_sheet,
            );

            if passed {
                sheets_passed += 1;
            }

            infos.insert(
                sheet.id.to_string(),
                SubjectStatus {
                    achieved,
                    total,
                    no: sheet.sheet_no,
                    unit: ScheinCriteriaUnit::Point,
                    state: PassedState::from_verdict(passed),
                },
            );
        }

        let achieved = f64::from(sheets_passed);
        let total = sheets.iter().filter(|sheet| !sheet.bonus_sheet).count() as f64;

        Ok(StatusBreakdown {
            identifier: CriterionIdentifier::SheetIndividual,
            achieved,
            total,
            unit: ScheinCriteriaUnit::Sheet,
            passed: threshold_reached(achieved, total, self.value_needed, self.percentage),
            infos,
        })
    }
}
