use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use crate::model::{
    Attendance, AttendanceState, CourseSnapshot, Exercise, PointId, PointMap, ScheinExam, Sheet,
    Student, Team, TeamId, Tutorial, TutorialId,
};
use crate::scheincriteria::criteria::{CriterionId, CriterionRecord};
use crate::scheincriteria::payload::CriterionDto;
use crate::scheincriteria::repository::{
    CourseSnapshotSource, CriteriaRepository, RepositoryError,
};
use crate::scheincriteria::{scheincriteria_router, CriteriaRegistry, ScheincriteriaService};

pub(super) fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, day).expect("valid date")
}

/// Tutorial meeting on five dates.
pub(super) fn tutorial() -> Tutorial {
    Tutorial {
        id: TutorialId::new(),
        slot: "Mo 10:00".to_string(),
        dates: (0..5).map(|week| date(1 + week * 7)).collect(),
    }
}

/// Sheet with two exercises worth 6 and 4 points.
pub(super) fn sheet(sheet_no: u32, bonus_sheet: bool) -> Sheet {
    Sheet {
        id: Uuid::new_v4(),
        sheet_no,
        exercises: vec![Exercise::new(1, 6.0), Exercise::new(2, 4.0)],
        bonus_sheet,
    }
}

/// Exam with two exercises worth 30 and 20 points, passed at half the points.
pub(super) fn exam(scheinexam_no: u32) -> ScheinExam {
    ScheinExam {
        id: Uuid::new_v4(),
        scheinexam_no,
        exercises: vec![Exercise::new(1, 30.0), Exercise::new(2, 20.0)],
        date: date(20 + scheinexam_no),
        percentage_needed: 0.5,
    }
}

pub(super) fn student_in(tutorial: &Tutorial, firstname: &str) -> Student {
    Student::new(firstname, "Muster", tutorial.id)
}

/// Records `states` on the first tutorial dates, in order.
pub(super) fn attend(student: &mut Student, tutorial: &Tutorial, states: &[AttendanceState]) {
    for (date, state) in tutorial.dates.iter().zip(states) {
        student.set_attendance(Attendance {
            student: student.id,
            date: *date,
            state: *state,
            note: None,
        });
    }
}

pub(super) fn present(count: usize) -> Vec<AttendanceState> {
    vec![AttendanceState::Present; count]
}

/// Splits `points` over the sheet's exercises, filling them in order.
pub(super) fn award(points: &mut PointMap, sheet: &Sheet, mut remaining: f64) {
    for exercise in &sheet.exercises {
        let awarded = remaining.min(exercise.max_points);
        points.set_points(PointId::new(sheet.id, exercise.ex_no), awarded);
        remaining -= awarded;
    }
}

pub(super) fn grade_exam(student: &mut Student, exam: &ScheinExam, mut remaining: f64) {
    for exercise in &exam.exercises {
        let awarded = remaining.min(exercise.max_points);
        student
            .scheinexam_results
            .set_points(PointId::new(exam.id, exercise.ex_no), awarded);
        remaining -= awarded;
    }
}

pub(super) fn team_in(tutorial: &Tutorial, members: &mut [&mut Student]) -> Team {
    let team = Team {
        id: TeamId::new(),
        team_no: 1,
        tutorial: tutorial.id,
        students: members.iter().map(|student| student.id).collect(),
        points: PointMap::new(),
    };
    for member in members.iter_mut() {
        member.team = Some(team.id);
    }
    team
}

/// Course with three regular sheets, one bonus sheet, two exams, and two students:
/// `students[0]` does well everywhere, `students[1]` barely shows up.
pub(super) fn course() -> CourseSnapshot {
    let tutorial = tutorial();
    let sheets = vec![sheet(1, false), sheet(2, false), sheet(3, false), sheet(4, true)];
    let scheinexams = vec![exam(1), exam(2)];

    let mut diligent = student_in(&tutorial, "Dora");
    let mut absent = student_in(&tutorial, "Anton");
    let mut team = team_in(&tutorial, &mut [&mut diligent, &mut absent]);

    for sheet in &sheets[..3] {
        award(&mut team.points, sheet, 5.0);
    }
    award(&mut diligent.points, &sheets[3], 10.0);
    award(&mut absent.points, &sheets[0], 1.0);

    attend(&mut diligent, &tutorial, &present(5));
    attend(
        &mut absent,
        &tutorial,
        &[AttendanceState::Present, AttendanceState::Unexcused],
    );

    diligent.presentation_points.insert(sheets[0].id, 1.0);
    diligent.presentation_points.insert(sheets[1].id, 1.0);

    grade_exam(&mut diligent, &scheinexams[0], 40.0);
    grade_exam(&mut diligent, &scheinexams[1], 35.0);
    grade_exam(&mut absent, &scheinexams[0], 10.0);

    CourseSnapshot {
        sheets,
        scheinexams,
        tutorials: vec![tutorial],
        teams: vec![team],
        students: vec![diligent, absent],
    }
}

pub(super) fn registry() -> Arc<CriteriaRegistry> {
    Arc::new(CriteriaRegistry::builtin().expect("builtin criteria register"))
}

pub(super) fn dto(identifier: &str, name: &str, data: Value) -> CriterionDto {
    let data = match data {
        Value::Object(map) => map,
        other => panic!("criterion data must be an object, got {other}"),
    };
    CriterionDto {
        identifier: identifier.to_string(),
        name: name.to_string(),
        data,
    }
}

pub(super) fn attendance_dto() -> CriterionDto {
    dto(
        "attendance",
        "Anwesenheit",
        serde_json::json!({ "valueNeeded": 4, "percentage": false }),
    )
}

pub(super) fn sheet_total_dto() -> CriterionDto {
    dto(
        "sheetTotal",
        "Punkte gesamt",
        serde_json::json!({ "valueNeeded": 0.5, "percentage": true }),
    )
}

#[derive(Default, Clone)]
pub(super) struct MemoryCriteria {
    pub(super) records: Arc<Mutex<BTreeMap<CriterionId, CriterionRecord>>>,
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
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id, record);
        Ok(())
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

pub(super) struct FixedCourse(pub(super) CourseSnapshot);

impl CourseSnapshotSource for FixedCourse {
    fn snapshot(&self) -> Result<CourseSnapshot, RepositoryError> {
        Ok(self.0.clone())
    }
}

pub(super) struct UnavailableRepository;

impl CriteriaRepository for UnavailableRepository {
    fn insert(&self, _record: CriterionRecord) -> Result<CriterionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: CriterionRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &CriterionId) -> Result<Option<CriterionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<CriterionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: &CriterionId) -> Result<CriterionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl CourseSnapshotSource for UnavailableRepository {
    fn snapshot(&self) -> Result<CourseSnapshot, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    ScheincriteriaService<MemoryCriteria, FixedCourse>,
    Arc<MemoryCriteria>,
    CourseSnapshot,
) {
    let course = course();
    let repository = Arc::new(MemoryCriteria::default());
    let service = ScheincriteriaService::new(
        registry(),
        repository.clone(),
        Arc::new(FixedCourse(course.clone())),
    );
    (service, repository, course)
}

pub(super) fn router_with_service(
    service: ScheincriteriaService<MemoryCriteria, FixedCourse>,
) -> axum::Router {
    scheincriteria_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
