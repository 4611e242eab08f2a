//! Schein criteria: configurable achievement rules, their form schema, and per-student verdicts.
//!
//! Criteria are stored as one of five tagged variants. Each variant declares its configuration
//! fields once; [`CriteriaRegistry`] resolves those declarations into form descriptors at startup
//! and validates incoming payloads against them. [`SummaryEngine`] evaluates every stored
//! criterion for a student against an [`EvaluationContext`] borrowed from a course snapshot.

pub mod context;
pub mod criteria;
pub mod form;
pub mod payload;
pub mod registry;
pub mod repository;
pub mod router;
pub mod service;
pub mod status;
pub mod summary;

#[cfg(test)]
mod tests;

pub use context::EvaluationContext;
pub use criteria::{
    AttendanceCriteria, CriteriaError, Criterion, CriterionBlueprint, CriterionId,
    CriterionIdentifier, CriterionRecord, PresentationCriteria, ScheinexamCriteria,
    SheetIndividualCriteria, SheetTotalCriteria, UnknownIdentifier,
};
pub use form::{FieldDeclaration, FormFieldDescriptor, FormSelectValue};
pub use payload::{CriterionDto, PayloadError};
pub use registry::{
    CriteriaRegistry, CriterionSchema, FormDataResponse, FormDataSet, RegistryBuilder,
    RegistryError,
};
pub use repository::{CourseSnapshotSource, CriteriaRepository, RepositoryError};
pub use router::scheincriteria_router;
pub use service::{ScheincriteriaService, ScheincriteriaServiceError};
pub use status::{PassedState, ScheinCriteriaUnit, StatusBreakdown, SubjectStatus};
pub use summary::{
    criteria_information, CriteriaInformation, CriterionOutcome, CriterionStatus,
    EvaluationFailure, ScheinCriteriaSummary, SummaryEngine,
};
