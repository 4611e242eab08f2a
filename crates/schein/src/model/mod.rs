//! Value types the criteria evaluate: point maps, sheets and exams, and the course roster.

pub mod achievement;
pub mod points;
pub mod roster;

pub use achievement::{Exercise, ScheinExam, Sheet};
pub use points::{EntryPoints, PointEntry, PointId, PointIdParseError, PointMap};
pub use roster::{
    Attendance, AttendanceState, RosterError, Student, StudentId, StudentStatus, Team, TeamId,
    Tutorial, TutorialId,
};

use serde::{Deserialize, Serialize};

/// Everything the criteria need to evaluate a course, as handed over by the storage layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSnapshot {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
    #[serde(default)]
    pub scheinexams: Vec<ScheinExam>,
    #[serde(default)]
    pub tutorials: Vec<Tutorial>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub students: Vec<Student>,
}

impl CourseSnapshot {
    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|student| &student.id == id)
    }

    pub fn tutorial(&self, id: &TutorialId) -> Option<&Tutorial> {
        self.tutorials.iter().find(|tutorial| &tutorial.id == id)
    }

    pub fn students_of_tutorial<'a>(
        &'a self,
        tutorial: &'a TutorialId,
    ) -> impl Iterator<Item = &'a Student> + 'a {
        self.students
            .iter()
            .filter(move |student| &student.tutorial == tutorial)
    }
}
