use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::achievement::{ScheinExam, Sheet};
use super::points::{PointId, PointMap};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Identifier of an enrolled student.
    StudentId
);
uuid_id!(TeamId);
uuid_id!(TutorialId);

/// How a student showed up to a tutorial date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceState {
    Present,
    Excused,
    Unexcused,
}

impl AttendanceState {
    /// Present and excused dates both count towards attendance requirements.
    pub const fn counts_as_attended(self) -> bool {
        matches!(self, AttendanceState::Present | AttendanceState::Excused)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub student: StudentId,
    pub date: NaiveDate,
    pub state: AttendanceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    NoScheinRequired,
}

/// Tutorial group with its scheduled dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutorial {
    pub id: TutorialId,
    pub slot: String,
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
}

/// Students handing in sheets together. Points stored here are shared by all members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub team_no: u32,
    pub tutorial: TutorialId,
    #[serde(default)]
    pub students: Vec<StudentId>,
    #[serde(default)]
    pub points: PointMap,
}

impl Team {
    pub fn is_member(&self, student: &StudentId) -> bool {
        self.students.contains(student)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("student {student} is not a member of team {team}")]
    NotATeamMember { student: StudentId, team: TeamId },
    #[error("student {student} must leave team {current} before joining another team")]
    StillInTeam { student: StudentId, current: TeamId },
    #[error("team {team} is part of tutorial {team_tutorial}, not {student_tutorial}")]
    ForeignTutorial {
        student: StudentId,
        team: TeamId,
        team_tutorial: TutorialId,
        student_tutorial: TutorialId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub firstname: String,
    pub lastname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matriculation_no: Option<String>,
    pub tutorial: TutorialId,
    #[serde(default)]
    pub team: Option<TeamId>,
    #[serde(default)]
    pub status: StudentStatus,
    /// Points recorded for this student only. They override the team's points.
    #[serde(default)]
    pub points: PointMap,
    /// Presentation points keyed by sheet id.
    #[serde(default)]
    pub presentation_points: BTreeMap<Uuid, f64>,
    #[serde(default)]
    pub scheinexam_results: PointMap,
    #[serde(default)]
    pub attendances: BTreeMap<NaiveDate, Attendance>,
}

impl Student {
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        tutorial: TutorialId,
    ) -> Self {
        Self {
            id: StudentId::new(),
            firstname: firstname.into(),
            lastname: lastname.into(),
            matriculation_no: None,
            tutorial,
            team: None,
            status: StudentStatus::Active,
            points: PointMap::new(),
            presentation_points: BTreeMap::new(),
            scheinexam_results: PointMap::new(),
            attendances: BTreeMap::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}, {}", self.lastname, self.firstname)
    }

    /// Merged view of the team's points overlaid by the student's own points.
    pub fn points_of_student(&self, team: Option<&Team>) -> PointMap {
        let mut merged = team.map(|team| team.points.clone()).unwrap_or_default();
        merged.overlay(&self.points);
        merged
    }

    /// Points for one exercise. Own entries win over the team's entry; nothing recorded is 0.
    pub fn points_of_exercise(&self, team: Option<&Team>, id: &PointId) -> f64 {
        self.points
            .points(id)
            .or_else(|| team.and_then(|team| team.points.points(id)))
            .unwrap_or(0.0)
    }

    pub fn points_on_sheet(&self, team: Option<&Team>, sheet: &Sheet) -> f64 {
        sheet
            .point_ids()
            .map(|id| self.points_of_exercise(team, &id))
            .sum()
    }

    pub fn exam_result(&self, exam: &ScheinExam) -> f64 {
        exam.point_ids()
            .filter_map(|id| self.scheinexam_results.points(&id))
            .sum()
    }

    /// Copies the team's points the student has not overridden into the student's own map.
    pub fn move_team_points(&mut self, team: &Team) -> usize {
        self.points.fill_missing_from(&team.points)
    }

    /// Leaves `team`, keeping every team point the student has not overridden.
    pub fn leave_team(&mut self, team: &mut Team) -> Result<usize, RosterError> {
        if self.team != Some(team.id) {
            return Err(RosterError::NotATeamMember {
                student: self.id,
                team: team.id,
            });
        }

        let moved = self.move_team_points(team);
        team.students.retain(|member| member != &self.id);
        self.team = None;
        Ok(moved)
    }

    /// Joins `next`, leaving `previous` first when the student currently has a team.
    ///
    /// `previous` must be the student's current team, so its points are moved before the
    /// membership changes.
    pub fn join_team(
        &mut self,
        previous: Option<&mut Team>,
        next: &mut Team,
    ) -> Result<usize, RosterError> {
        if next.tutorial != self.tutorial {
            return Err(RosterError::ForeignTutorial {
                student: self.id,
                team: next.id,
                team_tutorial: next.tutorial,
                student_tutorial: self.tutorial,
            });
        }

        let moved = match (previous, self.team) {
            (_, Some(current)) if current == next.id => 0,
            (Some(team), _) => self.leave_team(team)?,
            (None, Some(current)) => {
                return Err(RosterError::StillInTeam {
                    student: self.id,
                    current,
                })
            }
            (None, None) => 0,
        };

        if !next.is_member(&self.id) {
            next.students.push(self.id);
        }
        self.team = Some(next.id);
        Ok(moved)
    }

    pub fn set_attendance(&mut self, attendance: Attendance) {
        self.attendances.insert(attendance.date, attendance);
    }

    pub fn attendance_on(&self, date: &NaiveDate) -> Option<&Attendance> {
        self.attendances.get(date)
    }

    pub fn total_presentation_points(&self) -> f64 {
        self.presentation_points.values().sum()
    }
}
