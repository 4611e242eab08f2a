use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::points::PointId;

/// Single exercise of a sheet or exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub ex_no: u32,
    pub max_points: f64,
    #[serde(default)]
    pub bonus: bool,
}

impl Exercise {
    pub fn new(ex_no: u32, max_points: f64) -> Self {
        Self {
            ex_no,
            max_points,
            bonus: false,
        }
    }

    pub fn bonus(ex_no: u32, max_points: f64) -> Self {
        Self {
            ex_no,
            max_points,
            bonus: true,
        }
    }
}

fn required_points(exercises: &[Exercise]) -> f64 {
    exercises
        .iter()
        .filter(|exercise| !exercise.bonus)
        .map(|exercise| exercise.max_points)
        .sum()
}

/// Exercise sheet handed out during the term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: Uuid,
    pub sheet_no: u32,
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub bonus_sheet: bool,
}

impl Sheet {
    /// Points reachable without bonus exercises.
    pub fn max_points(&self) -> f64 {
        required_points(&self.exercises)
    }

    pub fn max_points_with_bonus(&self) -> f64 {
        self.exercises
            .iter()
            .map(|exercise| exercise.max_points)
            .sum()
    }

    pub fn point_ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.exercises
            .iter()
            .map(|exercise| PointId::new(self.id, exercise.ex_no))
    }
}

/// Graded exam that counts towards the Schein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheinExam {
    pub id: Uuid,
    pub scheinexam_no: u32,
    pub exercises: Vec<Exercise>,
    pub date: NaiveDate,
    /// Fraction of the total points needed to pass this exam on its own.
    pub percentage_needed: f64,
}

impl ScheinExam {
    pub fn total_points(&self) -> f64 {
        required_points(&self.exercises)
    }

    pub fn point_ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.exercises
            .iter()
            .map(|exercise| PointId::new(self.id, exercise.ex_no))
    }
}
