use uuid::Uuid;

use crate::model::{CourseSnapshot, ScheinExam, Sheet, Student, Team, Tutorial};

use super::criteria::CriteriaError;

/// Read-only lookups a criterion may need besides the student itself.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    sheets: &'a [Sheet],
    scheinexams: &'a [ScheinExam],
    tutorials: &'a [Tutorial],
    teams: &'a [Team],
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        sheets: &'a [Sheet],
        scheinexams: &'a [ScheinExam],
        tutorials: &'a [Tutorial],
        teams: &'a [Team],
    ) -> Self {
        Self {
            sheets,
            scheinexams,
            tutorials,
            teams,
        }
    }

    pub fn from_snapshot(snapshot: &'a CourseSnapshot) -> Self {
        Self::new(
            &snapshot.sheets,
            &snapshot.scheinexams,
            &snapshot.tutorials,
            &snapshot.teams,
        )
    }

    pub fn sheets(&self) -> &'a [Sheet] {
        self.sheets
    }

    pub fn scheinexams(&self) -> &'a [ScheinExam] {
        self.scheinexams
    }

    pub fn sheet(&self, id: &Uuid) -> Result<&'a Sheet, CriteriaError> {
        self.sheets
            .iter()
            .find(|sheet| &sheet.id == id)
            .ok_or(CriteriaError::SheetNotFound(*id))
    }

    pub fn tutorial_of(&self, student: &Student) -> Result<&'a Tutorial, CriteriaError> {
        self.tutorials
            .iter()
            .find(|tutorial| tutorial.id == student.tutorial)
            .ok_or(CriteriaError::TutorialNotFound(student.tutorial))
    }

    /// The student's team, `None` when the student has none.
    pub fn team_of(&self, student: &Student) -> Result<Option<&'a Team>, CriteriaError> {
        match student.team {
            None => Ok(None),
            Some(id) => self
                .teams
                .iter()
                .find(|team| team.id == id)
                .map(Some)
                .ok_or(CriteriaError::TeamNotFound(id)),
        }
    }
}
