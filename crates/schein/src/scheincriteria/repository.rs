use crate::model::CourseSnapshot;

use super::criteria::{CriterionId, CriterionRecord};

/// Storage of configured criteria, so the service can be exercised without a database.
pub trait CriteriaRepository: Send + Sync {
    fn insert(&self, record: CriterionRecord) -> Result<CriterionRecord, RepositoryError>;
    fn update(&self, record: CriterionRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &CriterionId) -> Result<Option<CriterionRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<CriterionRecord>, RepositoryError>;
    fn remove(&self, id: &CriterionId) -> Result<CriterionRecord, RepositoryError>;
}

/// Supplies the students, sheets, exams, tutorials and teams criteria are evaluated against.
pub trait CourseSnapshotSource: Send + Sync {
    fn snapshot(&self) -> Result<CourseSnapshot, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
