//! End-to-end scenarios for criteria management and student evaluation.
//!
//! A course dataset is loaded from its JSON wire form, criteria are created through the HTTP
//! router, and verdicts are read back the way the tutor frontend consumes them.

mod common {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use axum::response::Response;
    use serde_json::Value;

    use schein::model::CourseSnapshot;
    use schein::scheincriteria::{
        CourseSnapshotSource, CriteriaRegistry, CriteriaRepository, CriterionId, CriterionRecord,
        RepositoryError, ScheincriteriaService,
    };

    pub(super) const TUTORIAL: &str = "5b0c1b6e-2f7a-4a47-9f57-4c0cf1d9d001";
    pub(super) const SHEET_ONE: &str = "0f8e4f5c-8d0a-4a55-b0f4-1ad5d3a0a101";
    pub(super) const SHEET_TWO: &str = "0f8e4f5c-8d0a-4a55-b0f4-1ad5d3a0a102";
    pub(super) const EXAM: &str = "77e8b1c2-6a0b-49a5-9d7b-8d7d7b0e0201";
    pub(super) const TEAM: &str = "c3e3f0a9-1b3f-4d5e-8a52-0d6a3c5e0301";
    pub(super) const MARA: &str = "a1d5c9e0-3b6c-4c7a-8e0e-5e4f0b7c0401";
    pub(super) const JONAS: &str = "a1d5c9e0-3b6c-4c7a-8e0e-5e4f0b7c0402";

    pub(super) fn dataset() -> Value {
        serde_json::json!({
            "sheets": [
                {
                    "id": SHEET_ONE,
                    "sheetNo": 1,
                    "exercises": [
                        { "exNo": 1, "maxPoints": 10.0 },
                        { "exNo": 2, "maxPoints": 10.0 }
                    ]
                },
                {
                    "id": SHEET_TWO,
                    "sheetNo": 2,
                    "exercises": [
                        { "exNo": 1, "maxPoints": 20.0 },
                        { "exNo": 2, "maxPoints": 5.0, "bonus": true }
                    ]
                }
            ],
            "scheinexams": [
                {
                    "id": EXAM,
                    "scheinexamNo": 1,
                    "date": "2026-07-20",
                    "percentageNeeded": 0.5,
                    "exercises": [{ "exNo": 1, "maxPoints": 60.0 }]
                }
            ],
            "tutorials": [
                {
                    "id": TUTORIAL,
                    "slot": "Di 14:00",
                    "dates": ["2026-04-14", "2026-04-21", "2026-04-28", "2026-05-05"]
                }
            ],
            "teams": [
                {
                    "id": TEAM,
                    "teamNo": 1,
                    "tutorial": TUTORIAL,
                    "students": [MARA, JONAS],
                    "points": {
                        format!("ID::{SHEET_ONE}--Ex::1"): { "points": 8.0 },
                        format!("ID::{SHEET_ONE}--Ex::2"): { "points": { "a": 3.0, "b": 4.0 } },
                        format!("ID::{SHEET_TWO}--Ex::1"): { "points": 15.0, "comment": "gut" }
                    }
                }
            ],
            "students": [
                {
                    "id": MARA,
                    "firstname": "Mara",
                    "lastname": "Lindqvist",
                    "tutorial": TUTORIAL,
                    "team": TEAM,
                    "points": {
                        format!("ID::{SHEET_TWO}--Ex::2"): { "points": 5.0 }
                    },
                    "presentationPoints": { SHEET_ONE: 1.0 },
                    "scheinexamResults": {
                        format!("ID::{EXAM}--Ex::1"): { "points": 42.0 }
                    },
                    "attendances": {
                        "2026-04-14": { "student": MARA, "date": "2026-04-14", "state": "PRESENT" },
                        "2026-04-21": { "student": MARA, "date": "2026-04-21", "state": "EXCUSED" },
                        "2026-04-28": { "student": MARA, "date": "2026-04-28", "state": "PRESENT" }
                    }
                },
                {
                    "id": JONAS,
                    "firstname": "Jonas",
                    "lastname": "Brandt",
                    "tutorial": TUTORIAL,
                    "team": TEAM,
                    "points": {
                        format!("ID::{SHEET_TWO}--Ex::1"): { "points": 2.0 }
                    },
                    "scheinexamResults": {
                        format!("ID::{EXAM}--Ex::1"): { "points": 12.0 }
                    },
                    "attendances": {
                        "2026-04-14": { "student": JONAS, "date": "2026-04-14", "state": "UNEXCUSED" }
                    }
                }
            ]
        })
    }

    pub(super) fn snapshot() -> CourseSnapshot {
        serde_json::from_value(dataset()).expect("dataset matches the wire format")
    }

    #[derive(Default)]
    pub(super) struct MemoryCriteria {
        records: Mutex<BTreeMap<CriterionId, CriterionRecord>>,
    }

    impl CriteriaRepository for MemoryCriteria {
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
            match guard.get_mut(&record.id) {
                Some(stored) => {
                    *stored = record;
                    Ok(())
                }
                None => Err(RepositoryError::NotFound),
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

    pub(super) struct DatasetCourse(pub(super) CourseSnapshot);

    impl CourseSnapshotSource for DatasetCourse {
        fn snapshot(&self) -> Result<CourseSnapshot, RepositoryError> {
            Ok(self.0.clone())
        }
    }

    pub(super) fn service() -> Arc<ScheincriteriaService<MemoryCriteria, DatasetCourse>> {
        let registry = CriteriaRegistry::builtin().expect("builtin criteria register");
        Arc::new(ScheincriteriaService::new(
            Arc::new(registry),
            Arc::new(MemoryCriteria::default()),
            Arc::new(DatasetCourse(snapshot())),
        ))
    }

    pub(super) async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }
}

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;
use schein::model::{PointId, StudentId};
use schein::scheincriteria::scheincriteria_router;

fn post_criterion(body: Value) -> Request<Body> {
    Request::post("/api/v1/scheincriteria")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[test]
fn dataset_resolves_team_points_with_student_overrides() {
    let course = snapshot();
    let team = course.teams.first();
    let jonas = course
        .student(&StudentId(JONAS.parse().unwrap()))
        .expect("jonas enrolled");

    let sheet_two_ex_one: PointId = format!("ID::{SHEET_TWO}--Ex::1").parse().unwrap();
    assert_eq!(jonas.points_of_exercise(team, &sheet_two_ex_one), 2.0);
    assert_eq!(jonas.points_on_sheet(team, &course.sheets[0]), 15.0);
}

#[tokio::test]
async fn configured_criteria_yield_per_student_verdicts() {
    let router = scheincriteria_router(service());

    for criterion in [
        json!({
            "identifier": "attendance",
            "name": "Anwesenheit",
            "data": { "valueNeeded": 0.75, "percentage": true }
        }),
        json!({
            "identifier": "sheetTotal",
            "name": "Übungspunkte",
            "data": { "valueNeeded": 0.5, "percentage": true }
        }),
        json!({
            "identifier": "scheinexam",
            "name": "Klausur",
            "data": { "passAllExamsIndividually": true, "percentageOfAllPointsNeeded": 0.5 }
        }),
    ] {
        let response = router
            .clone()
            .oneshot(post_criterion(criterion))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/v1/scheincriteria/student")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let results = read_json_body(response).await;

    assert_eq!(results[MARA]["passed"], json!(true));
    assert_eq!(results[JONAS]["passed"], json!(false));

    let mara_criteria = results[MARA]["scheinCriteriaSummary"]
        .as_object()
        .expect("summary map");
    let sheet_total = mara_criteria
        .values()
        .find(|status| status["identifier"] == json!("sheetTotal"))
        .expect("sheet total evaluated");
    assert_eq!(sheet_total["achieved"], json!(35.0));
    assert_eq!(sheet_total["total"], json!(40.0));
    assert_eq!(sheet_total["unit"], json!("POINT"));
}

#[tokio::test]
async fn invalid_configuration_is_rejected_with_reason() {
    let router = scheincriteria_router(service());

    let response = router
        .clone()
        .oneshot(post_criterion(json!({
            "identifier": "sheetIndividual",
            "name": "Blätter",
            "data": {
                "valueNeeded": 2,
                "percentage": false,
                "valuePerSheetNeeded": 1.5,
                "percentagePerSheet": true
            }
        })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("valuePerSheetNeeded"));

    let listed = router
        .oneshot(
            Request::get("/api/v1/scheincriteria")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(read_json_body(listed).await, json!([]));
}

#[tokio::test]
async fn unknown_student_yields_not_found() {
    let router = scheincriteria_router(service());

    let response = router
        .oneshot(
            Request::get(format!(
                "/api/v1/scheincriteria/student/{}",
                uuid::Uuid::new_v4()
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
