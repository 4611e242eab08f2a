use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

const ID_PREFIX: &str = "ID::";
const EXERCISE_SEPARATOR: &str = "--Ex::";
const HYPHENATED_UUID_LEN: usize = 36;

/// Key addressing the points an entity (sheet or exam) awards on one of its exercises.
///
/// The canonical string form `ID::<uuid>--Ex::<no>` is used wherever the key has to travel as a
/// JSON object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId {
    pub entity: Uuid,
    pub exercise: u32,
}

impl PointId {
    pub const fn new(entity: Uuid, exercise: u32) -> Self {
        Self { entity, exercise }
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ID_PREFIX}{}{EXERCISE_SEPARATOR}{}",
            self.entity.hyphenated(),
            self.exercise
        )
    }
}

/// Reasons a string is not a valid `PointId`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointIdParseError {
    #[error("point id '{0}' must start with 'ID::'")]
    MissingPrefix(String),
    #[error("point id '{0}' must contain '--Ex::'")]
    MissingExercise(String),
    #[error("point id '{0}' does not carry a hyphenated uuid")]
    InvalidEntity(String),
    #[error("point id '{0}' does not carry a non-negative exercise number")]
    InvalidExercise(String),
}

impl FromStr for PointId {
    type Err = PointIdParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let rest = raw
            .strip_prefix(ID_PREFIX)
            .ok_or_else(|| PointIdParseError::MissingPrefix(raw.to_string()))?;
        let (entity, exercise) = rest
            .split_once(EXERCISE_SEPARATOR)
            .ok_or_else(|| PointIdParseError::MissingExercise(raw.to_string()))?;

        if entity.len() != HYPHENATED_UUID_LEN {
            return Err(PointIdParseError::InvalidEntity(raw.to_string()));
        }
        let entity =
            Uuid::parse_str(entity).map_err(|_| PointIdParseError::InvalidEntity(raw.to_string()))?;

        if exercise.is_empty() || !exercise.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(PointIdParseError::InvalidExercise(raw.to_string()));
        }
        let exercise = exercise
            .parse::<u32>()
            .map_err(|_| PointIdParseError::InvalidExercise(raw.to_string()))?;

        Ok(Self { entity, exercise })
    }
}

impl Serialize for PointId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PointId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PointIdVisitor;

        impl Visitor<'_> for PointIdVisitor {
            type Value = PointId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a point id of the form ID::<uuid>--Ex::<no>")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<PointId, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PointIdVisitor)
    }
}

/// Points recorded for an exercise, either as one score or split across its sub-exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryPoints {
    Total(f64),
    Subexercises(BTreeMap<String, f64>),
}

impl EntryPoints {
    pub fn sum(&self) -> f64 {
        match self {
            EntryPoints::Total(points) => *points,
            EntryPoints::Subexercises(points) => points.values().sum(),
        }
    }
}

/// One graded exercise, optionally annotated by the grader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub points: EntryPoints,
}

impl PointEntry {
    pub fn new(points: f64) -> Self {
        Self {
            comment: None,
            points: EntryPoints::Total(points),
        }
    }

    pub fn with_subexercises(points: BTreeMap<String, f64>) -> Self {
        Self {
            comment: None,
            points: EntryPoints::Subexercises(points),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn total(&self) -> f64 {
        self.points.sum()
    }
}

/// Points of a student or team keyed by `PointId`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointMap {
    entries: BTreeMap<PointId, PointEntry>,
}

impl PointMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: PointId, entry: PointEntry) {
        self.entries.insert(id, entry);
    }

    pub fn set_points(&mut self, id: PointId, points: f64) {
        self.set(id, PointEntry::new(points));
    }

    pub fn entry(&self, id: &PointId) -> Option<&PointEntry> {
        self.entries.get(id)
    }

    pub fn points(&self, id: &PointId) -> Option<f64> {
        self.entries.get(id).map(PointEntry::total)
    }

    pub fn has_entry(&self, id: &PointId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PointId, &PointEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies every entry of `other` into this map, replacing entries with the same key.
    pub fn overlay(&mut self, other: &PointMap) {
        for (id, entry) in other.entries() {
            self.entries.insert(*id, entry.clone());
        }
    }

    /// Copies the entries of `other` whose keys are not present yet. Returns how many were added.
    pub fn fill_missing_from(&mut self, other: &PointMap) -> usize {
        let mut added = 0;
        for (id, entry) in other.entries() {
            if !self.has_entry(id) {
                self.entries.insert(*id, entry.clone());
                added += 1;
            }
        }
        added
    }
}
