use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::model::{StudentId, TutorialId};

use super::context::EvaluationContext;
use super::criteria::{CriterionId, CriterionRecord};
use super::payload::{CriterionDto, PayloadError};
use super::registry::{CriteriaRegistry, FormDataResponse};
use super::repository::{CourseSnapshotSource, CriteriaRepository, RepositoryError};
use super::summary::{
    criteria_information, CriteriaInformation, ScheinCriteriaSummary, SummaryEngine,
};

/// Service composing the registry, the criteria store, and the course data source.
pub struct ScheincriteriaService<R, S> {
    registry: Arc<CriteriaRegistry>,
    repository: Arc<R>,
    course: Arc<S>,
}

impl<R, S> ScheincriteriaService<R, S>
where
    R: CriteriaRepository + 'static,
    S: CourseSnapshotSource + 'static,
{
    pub fn new(registry: Arc<CriteriaRegistry>, repository: Arc<R>, course: Arc<S>) -> Self {
        Self {
            registry,
            repository,
            course,
        }
    }

    pub fn registry(&self) -> &CriteriaRegistry {
        &self.registry
    }

    pub fn find_all(&self) -> Result<Vec<CriterionRecord>, ScheincriteriaServiceError> {
        Ok(self.repository.all()?)
    }

    pub fn find_by_id(
        &self,
        id: &CriterionId,
    ) -> Result<CriterionRecord, ScheincriteriaServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(ScheincriteriaServiceError::CriterionNotFound(*id))
    }

    /// Validate the payload against its identifier's schema and store the resulting criterion.
    pub fn create(
        &self,
        dto: CriterionDto,
    ) -> Result<CriterionRecord, ScheincriteriaServiceError> {
        let criterion = self.registry.parse_payload(&dto)?;
        let record = CriterionRecord::new(dto.name, criterion);
        let stored = self.repository.insert(record)?;

        info!(criterion = %stored.id, identifier = %stored.identifier(), "criterion created");
        Ok(stored)
    }

    /// Replace name and configuration of an existing criterion. The identifier may change.
    pub fn update(
        &self,
        id: &CriterionId,
        dto: CriterionDto,
    ) -> Result<CriterionRecord, ScheincriteriaServiceError> {
        let mut record = self.find_by_id(id)?;
        record.criterion = self.registry.parse_payload(&dto)?;
        record.name = dto.name;

        self.repository.update(record.clone()).map_err(|error| match error {
            RepositoryError::NotFound => ScheincriteriaServiceError::CriterionNotFound(*id),
            other => other.into(),
        })?;

        info!(criterion = %id, identifier = %record.identifier(), "criterion updated");
        Ok(record)
    }

    pub fn delete(&self, id: &CriterionId) -> Result<(), ScheincriteriaServiceError> {
        let removed = self.repository.remove(id).map_err(|error| match error {
            RepositoryError::NotFound => ScheincriteriaServiceError::CriterionNotFound(*id),
            other => other.into(),
        })?;

        info!(criterion = %removed.id, "criterion deleted");
        Ok(())
    }

    pub fn form_data(&self) -> FormDataResponse {
        self.registry.form_data()
    }

    pub fn result_of_student(
        &self,
        id: &StudentId,
    ) -> Result<ScheinCriteriaSummary, ScheincriteriaServiceError> {
        let criteria = self.repository.all()?;
        let snapshot = self.course.snapshot()?;
        let student = snapshot
            .student(id)
            .ok_or(ScheincriteriaServiceError::StudentNotFound(*id))?;

        let ctx = EvaluationContext::from_snapshot(&snapshot);
        Ok(SummaryEngine::new(&criteria).summarize(student, &ctx))
    }

    pub fn results_of_all_students(
        &self,
    ) -> Result<BTreeMap<StudentId, ScheinCriteriaSummary>, ScheincriteriaServiceError> {
        let criteria = self.repository.all()?;
        let snapshot = self.course.snapshot()?;
        let ctx = EvaluationContext::from_snapshot(&snapshot);

        debug!(
            students = snapshot.students.len(),
            criteria = criteria.len(),
            "evaluating all students"
        );
        Ok(SummaryEngine::new(&criteria).summarize_many(&snapshot.students, &ctx))
    }

    pub fn results_of_tutorial(
        &self,
        id: &TutorialId,
    ) -> Result<BTreeMap<StudentId, ScheinCriteriaSummary>, ScheincriteriaServiceError> {
        let criteria = self.repository.all()?;
        let snapshot = self.course.snapshot()?;
        if snapshot.tutorial(id).is_none() {
            return Err(ScheincriteriaServiceError::TutorialNotFound(*id));
        }

        let ctx = EvaluationContext::from_snapshot(&snapshot);
        let students = snapshot.students_of_tutorial(id);
        Ok(SummaryEngine::new(&criteria).summarize_many(students, &ctx))
    }

    pub fn info_about_criteria(
        &self,
        id: &CriterionId,
    ) -> Result<CriteriaInformation, ScheincriteriaServiceError> {
        let record = self.find_by_id(id)?;
        let snapshot = self.course.snapshot()?;
        let ctx = EvaluationContext::from_snapshot(&snapshot);

        Ok(criteria_information(&record, &snapshot.students, &ctx))
    }
}

/// Error raised by the scheincriteria service.
#[derive(Debug, thiserror::Error)]
pub enum ScheincriteriaServiceError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("criterion {0} not found")]
    CriterionNotFound(CriterionId),
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    #[error("tutorial {0} not found")]
    TutorialNotFound(TutorialId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
