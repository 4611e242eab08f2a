//! The closed set of criterion variants and their configuration.

mod attendance;
mod exam;
mod presentation;
mod sheet_individual;
mod sheet_total;

pub use attendance::AttendanceCriteria;
pub use exam::ScheinexamCriteria;
pub use presentation::PresentationCriteria;
pub use sheet_individual::SheetIndividualCriteria;
pub use sheet_total::SheetTotalCriteria;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Student, TeamId, TutorialId};

use super::context::EvaluationContext;
use super::form::FieldDeclaration;
use super::status::StatusBreakdown;

/// Wire name of a criterion variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriterionIdentifier {
    Attendance,
    Presentation,
    Scheinexam,
    SheetIndividual,
    SheetTotal,
}

impl CriterionIdentifier {
    pub const ALL: [CriterionIdentifier; 5] = [
        CriterionIdentifier::Attendance,
        CriterionIdentifier::Presentation,
        CriterionIdentifier::Scheinexam,
        CriterionIdentifier::SheetIndividual,
        CriterionIdentifier::SheetTotal,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CriterionIdentifier::Attendance => "attendance",
            CriterionIdentifier::Presentation => "presentation",
            CriterionIdentifier::Scheinexam => "scheinexam",
            CriterionIdentifier::SheetIndividual => "sheetIndividual",
            CriterionIdentifier::SheetTotal => "sheetTotal",
        }
    }
}

impl fmt::Display for CriterionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no criterion is registered for identifier '{0}'")]
pub struct UnknownIdentifier(pub String);

impl FromStr for CriterionIdentifier {
    type Err = UnknownIdentifier;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|identifier| identifier.as_str() == value)
            .ok_or_else(|| UnknownIdentifier(value.to_string()))
    }
}

/// Identifier of a stored criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionId(pub Uuid);

impl CriterionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CriterionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CriterionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An entity a criterion depends on is missing from the evaluation context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    #[error("sheet {0} not found")]
    SheetNotFound(Uuid),
    #[error("tutorial {0} not found")]
    TutorialNotFound(TutorialId),
    #[error("team {0} not found")]
    TeamNotFound(TeamId),
}

/// Static description of a variant's configuration fields, read once when the registry is built.
pub trait CriterionBlueprint {
    const IDENTIFIER: CriterionIdentifier;

    fn form_fields() -> Vec<FieldDeclaration>;
}

/// Configuration of one criterion, tagged by its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "identifier", content = "data", rename_all = "camelCase")]
pub enum Criterion {
    Attendance(AttendanceCriteria),
    Presentation(PresentationCriteria),
    Scheinexam(ScheinexamCriteria),
    SheetIndividual(SheetIndividualCriteria),
    SheetTotal(SheetTotalCriteria),
}

impl Criterion {
    pub fn identifier(&self) -> CriterionIdentifier {
        match self {
            Criterion::Attendance(_) => CriterionIdentifier::Attendance,
            Criterion::Presentation(_) => CriterionIdentifier::Presentation,
            Criterion::Scheinexam(_) => CriterionIdentifier::Scheinexam,
            Criterion::SheetIndividual(_) => CriterionIdentifier::SheetIndividual,
            Criterion::SheetTotal(_) => CriterionIdentifier::SheetTotal,
        }
    }

    pub fn status_breakdown(
        &self,
        student: &Student,
        ctx: &EvaluationContext<'_>,
    ) -> Result<StatusBreakdown, CriteriaError> {
        match self {
            Criterion::Attendance(criteria) => criteria.check_status(student, ctx),
            Criterion::Presentation(criteria) => criteria.check_status(student, ctx),
            Criterion::Scheinexam(criteria) => criteria.check_status(student, ctx),
            Criterion::SheetIndividual(criteria) => criteria.check_status(student, ctx),
            Criterion::SheetTotal(criteria) => criteria.check_status(student, ctx),
        }
    }

    pub fn is_passed(
        &self,
        student: &Student,
        ctx: &EvaluationContext<'_>,
    ) -> Result<bool, CriteriaError> {
        self.status_breakdown(student, ctx)
            .map(|breakdown| breakdown.passed)
    }
}

/// A named, stored criterion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionRecord {
    pub id: CriterionId,
    pub name: String,
    #[serde(flatten)]
    pub criterion: Criterion,
}

impl CriterionRecord {
    pub fn new(name: impl Into<String>, criterion: Criterion) -> Self {
        Self {
            id: CriterionId::new(),
            name: name.into(),
            criterion,
        }
    }

    pub fn identifier(&self) -> CriterionIdentifier {
        self.criterion.identifier()
    }
}
