use metrics_exporter_prometheus::PrometheusHandle;
use schein::config::CourseConfig;
use schein::error::AppError;
use schein::model::CourseSnapshot;
use schein::scheincriteria::{
    CourseSnapshotSource, CriteriaRepository, CriterionId, CriterionRecord, RepositoryError,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::demo::demo_course;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCriteriaRepository {
    records: Arc<Mutex<BTreeMap<CriterionId, CriterionRecord>>>,
}

impl CriteriaRepository for InMemoryCriteriaRepository {
    fn insert(&self, record: CriterionRecord) -> Result<CriterionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: CriterionRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id, record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &CriterionId) -> Result<Option<CriterionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<CriterionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn remove(&self, id: &CriterionId) -> Result<CriterionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

/// Serves one course snapshot loaded at startup.
#[derive(Clone)]
pub(crate) struct StaticCourseSource {
    snapshot: Arc<CourseSnapshot>,
}

impl StaticCourseSource {
    pub(crate) fn new(snapshot: CourseSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

impl CourseSnapshotSource for StaticCourseSource {
    fn snapshot(&self) -> Result<CourseSnapshot, RepositoryError> {
        Ok(self.snapshot.as_ref().clone())
    }
}

pub(crate) fn read_course(path: &Path) -> Result<CourseSnapshot, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let snapshot: CourseSnapshot = serde_json::from_str(&raw)?;
    info!(
        dataset = %path.display(),
        students = snapshot.students.len(),
        sheets = snapshot.sheets.len(),
        "course dataset loaded"
    );
    Ok(snapshot)
}

/// Loads the configured dataset, falling back to the bundled demo course.
pub(crate) fn load_course(config: &CourseConfig) -> Result<CourseSnapshot, AppError> {
    match &config.dataset {
        Some(path) => read_course(path),
        None => Ok(demo_course()),
    }
}
