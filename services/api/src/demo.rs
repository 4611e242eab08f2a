use crate::infra::{read_course, InMemoryCriteriaRepository, StaticCourseSource};
use chrono::NaiveDate;
use clap::Args;
use schein::config::AppConfig;
use schein::error::AppError;
use schein::model::{
    Attendance, AttendanceState, CourseSnapshot, Exercise, PointId, ScheinExam, Sheet, Student,
    StudentId, Team, TeamId, Tutorial, TutorialId,
};
use schein::scheincriteria::{
    CriteriaRegistry, CriterionDto, PayloadError, ScheinCriteriaSummary, ScheincriteriaService,
    ScheincriteriaServiceError,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Args, Debug, Default)]
pub(crate) struct FormArgs {
    /// Only print the descriptors of this criterion identifier
    #[arg(long)]
    pub(crate) identifier: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SummaryArgs {
    /// JSON course snapshot to evaluate. Defaults to SCHEIN_DATASET, then the demo course.
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
    /// JSON array of criterion payloads. Defaults to the demo criteria.
    #[arg(long)]
    pub(crate) criteria: Option<PathBuf>,
    /// Only evaluate this student
    #[arg(long)]
    pub(crate) student: Option<Uuid>,
    /// Print the raw summary JSON instead of the table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_form(args: FormArgs) -> Result<(), AppError> {
    let registry = CriteriaRegistry::builtin()?;

    let output = match args.identifier {
        Some(identifier) => match registry.schema(&identifier) {
            Some(schema) => serde_json::to_string_pretty(&schema.form_data())?,
            None => {
                return Err(ScheincriteriaServiceError::from(
                    PayloadError::UnknownIdentifier(identifier),
                )
                .into())
            }
        },
        None => serde_json::to_string_pretty(&registry.form_data())?,
    };

    println!("{output}");
    Ok(())
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let SummaryArgs {
        dataset,
        criteria,
        student,
        json,
    } = args;

    let dataset = match dataset {
        Some(path) => Some(path),
        None => AppConfig::load()?.course.dataset,
    };
    let course = match dataset {
        Some(path) => read_course(&path)?,
        None => demo_course(),
    };
    let criteria = match criteria {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => default_criteria(),
    };

    let service = build_service(course.clone(), criteria)?;
    let results = match student {
        Some(id) => {
            let id = StudentId(id);
            BTreeMap::from([(id, service.result_of_student(&id)?)])
        }
        None => service.results_of_all_students()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        render_summary(&course, &results);
    }
    Ok(())
}

/// Service over in-memory adapters, with `criteria` validated and stored.
pub(crate) fn build_service(
    course: CourseSnapshot,
    criteria: Vec<CriterionDto>,
) -> Result<ScheincriteriaService<InMemoryCriteriaRepository, StaticCourseSource>, AppError> {
    let service = ScheincriteriaService::new(
        Arc::new(CriteriaRegistry::builtin()?),
        Arc::new(InMemoryCriteriaRepository::default()),
        Arc::new(StaticCourseSource::new(course)),
    );
    for dto in criteria {
        service.create(dto)?;
    }
    Ok(service)
}

pub(crate) fn render_summary(
    course: &CourseSnapshot,
    results: &BTreeMap<StudentId, ScheinCriteriaSummary>,
) {
    println!("Schein criteria summary");
    let passed = results.values().filter(|summary| summary.passed).count();
    println!("- {passed} of {} students passed", results.len());

    for (id, summary) in results {
        let name = course
            .student(id)
            .map(|student| student.full_name())
            .unwrap_or_else(|| id.to_string());
        let verdict = if summary.passed { "PASSED" } else { "NOT PASSED" };
        println!("\n{name} ({id}): {verdict}");

        for status in summary.scheincriteria_summary.values() {
            match status.breakdown() {
                Some(breakdown) => println!(
                    "  - {} [{}]: {} / {} {:?} -> {}",
                    status.name,
                    breakdown.identifier,
                    breakdown.achieved,
                    breakdown.total,
                    breakdown.unit,
                    if breakdown.passed { "passed" } else { "not passed" }
                ),
                None => println!("  - {}: could not be evaluated", status.name),
            }
        }
    }
}

fn payload(identifier: &str, name: &str, data: Value) -> CriterionDto {
    let data = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    CriterionDto {
        identifier: identifier.to_string(),
        name: name.to_string(),
        data,
    }
}

/// Criteria a typical course configures: attendance, points, presentations, and the exam.
pub(crate) fn default_criteria() -> Vec<CriterionDto> {
    vec![
        payload(
            "attendance",
            "Anwesenheit",
            json!({ "valueNeeded": 0.75, "percentage": true }),
        ),
        payload(
            "sheetTotal",
            "Übungspunkte",
            json!({ "valueNeeded": 0.5, "percentage": true }),
        ),
        payload(
            "presentation",
            "Vorrechnen",
            json!({ "presentationsNeeded": 2 }),
        ),
        payload(
            "scheinexam",
            "Klausur",
            json!({ "passAllExamsIndividually": true, "percentageOfAllPointsNeeded": 0.5 }),
        ),
    ]
}

fn demo_date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap_or_default()
}

fn demo_sheet(no: u32, bonus_sheet: bool) -> Sheet {
    Sheet {
        id: Uuid::from_u128(0x5_0000 + u128::from(no)),
        sheet_no: no,
        exercises: vec![
            Exercise::new(1, 10.0),
            Exercise::new(2, 10.0),
            Exercise::bonus(3, 5.0),
        ],
        bonus_sheet,
    }
}

struct DemoStudent {
    no: u128,
    firstname: &'static str,
    lastname: &'static str,
    team: Option<usize>,
    attended: usize,
    presentations: usize,
    exam_points: f64,
}

const DEMO_STUDENTS: [DemoStudent; 4] = [
    DemoStudent {
        no: 1,
        firstname: "Mara",
        lastname: "Lindqvist",
        team: Some(0),
        attended: 6,
        presentations: 2,
        exam_points: 48.0,
    },
    DemoStudent {
        no: 2,
        firstname: "Jonas",
        lastname: "Brandt",
        team: Some(0),
        attended: 3,
        presentations: 1,
        exam_points: 25.0,
    },
    DemoStudent {
        no: 3,
        firstname: "Aylin",
        lastname: "Demir",
        team: Some(1),
        attended: 5,
        presentations: 2,
        exam_points: 27.0,
    },
    DemoStudent {
        no: 4,
        firstname: "Piet",
        lastname: "Hansen",
        team: None,
        attended: 6,
        presentations: 3,
        exam_points: 58.0,
    },
];

/// Small course used when no dataset is configured.
pub(crate) fn demo_course() -> CourseSnapshot {
    let tutorial = Tutorial {
        id: TutorialId(Uuid::from_u128(0x1_0001)),
        slot: "Mo 10:00".to_string(),
        dates: (0..6).map(|week| demo_date(4, 13) + chrono::Days::new(7 * week)).collect(),
    };
    let sheets: Vec<Sheet> = (1..=4).map(|no| demo_sheet(no, no == 4)).collect();
    let exam = ScheinExam {
        id: Uuid::from_u128(0x6_0001),
        scheinexam_no: 1,
        exercises: vec![Exercise::new(1, 30.0), Exercise::new(2, 30.0)],
        date: demo_date(7, 20),
        percentage_needed: 0.5,
    };

    let mut teams: Vec<Team> = (0..2)
        .map(|index| Team {
            id: TeamId(Uuid::from_u128(0x2_0001 + index as u128)),
            team_no: index + 1,
            tutorial: tutorial.id,
            students: Vec::new(),
            points: Default::default(),
        })
        .collect();
    for (team, earned) in teams.iter_mut().zip([[9.0, 7.0, 2.0], [5.0, 4.0, 0.0]]) {
        for sheet in &sheets[..3] {
            for (exercise, points) in sheet.exercises.iter().zip(earned) {
                team.points
                    .set_points(PointId::new(sheet.id, exercise.ex_no), points);
            }
        }
    }

    let students: Vec<Student> = DEMO_STUDENTS
        .iter()
        .map(|demo| {
            let mut student = Student::new(demo.firstname, demo.lastname, tutorial.id);
            student.id = StudentId(Uuid::from_u128(0x3_0000 + demo.no));
            student.matriculation_no = Some(format!("40{:04}", demo.no));

            if let Some(index) = demo.team {
                let team = &mut teams[index];
                team.students.push(student.id);
                student.team = Some(team.id);
            } else {
                for sheet in &sheets[..3] {
                    student
                        .points
                        .set_points(PointId::new(sheet.id, 1), 8.0);
                    student
                        .points
                        .set_points(PointId::new(sheet.id, 2), 8.0);
                }
            }
            student
                .points
                .set_points(PointId::new(sheets[3].id, 1), 4.0 * demo.no as f64);

            for (index, date) in tutorial.dates.iter().enumerate() {
                let state = if index < demo.attended {
                    AttendanceState::Present
                } else {
                    AttendanceState::Unexcused
                };
                student.set_attendance(Attendance {
                    student: student.id,
                    date: *date,
                    state,
                    note: None,
                });
            }

            for sheet in sheets.iter().take(demo.presentations) {
                student.presentation_points.insert(sheet.id, 1.0);
            }

            let first = demo.exam_points.min(30.0);
            student
                .scheinexam_results
                .set_points(PointId::new(exam.id, 1), first);
            student
                .scheinexam_results
                .set_points(PointId::new(exam.id, 2), demo.exam_points - first);

            student
        })
        .collect();

    CourseSnapshot {
        sheets,
        scheinexams: vec![exam],
        tutorials: vec![tutorial],
        teams,
        students,
    }
}
