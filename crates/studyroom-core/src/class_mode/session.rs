use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::clock::new_id;
use crate::error::ValidationError;

/// Lifecycle of a class session.
///
/// ```text
/// before -> during -> after -> completed
///             |
///             +--> (cancelled: discarded, never archived)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassPhase {
    Before,
    During,
    After,
    Completed,
}

impl ClassPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassPhase::Before => "before",
            ClassPhase::During => "during",
            ClassPhase::After => "after",
            ClassPhase::Completed => "completed",
        }
    }
}

impl fmt::Display for ClassPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveType {
    Concentration,
    Participation,
    Notes,
    Custom,
}

impl FromStr for ObjectiveType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concentration" => Ok(ObjectiveType::Concentration),
            "participation" => Ok(ObjectiveType::Participation),
            "notes" => Ok(ObjectiveType::Notes),
            "custom" => Ok(ObjectiveType::Custom),
            other => Err(ValidationError::InvalidValue {
                field: "objective_type".into(),
                message: format!("unknown objective type '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassObjective {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ObjectiveType,
    pub description: String,
    pub completed: bool,
}

impl ClassObjective {
    pub fn new(kind: ObjectiveType, description: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            kind,
            description: description.into(),
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroChallenge {
    pub id: String,
    pub description: String,
    pub completed: bool,
    pub points: u32,
}

/// Self-evaluation filled in when the class is completed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassEvaluation {
    /// 0..=10
    pub attention_score: u8,
    pub summary: String,
    pub to_review: String,
    pub challenge_completed: bool,
    pub objectives_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    pub id: String,
    pub subject_id: String,
    pub chapter_id: String,
    pub phase: ClassPhase,

    pub objectives: Vec<ClassObjective>,
    pub challenge: MicroChallenge,

    /// 0..=5, only changes during `during`.
    pub attention_level: u8,
    pub distraction_count: u32,
    pub quick_notes: Vec<String>,
    /// Minutes, fixed when the class ends.
    pub duration: u32,

    pub evaluation: ClassEvaluation,

    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub xp_earned: Option<u64>,
}

impl ClassSession {
    pub fn new(
        subject_id: impl Into<String>,
        chapter_id: impl Into<String>,
        challenge: MicroChallenge,
        attention_level: u8,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            subject_id: subject_id.into(),
            chapter_id: chapter_id.into(),
            phase: ClassPhase::Before,
            objectives: Vec::new(),
            challenge,
            attention_level: attention_level.min(5),
            distraction_count: 0,
            quick_notes: Vec::new(),
            duration: 0,
            evaluation: ClassEvaluation::default(),
            started_at: now,
            completed_at: None,
            xp_earned: None,
        }
    }

    pub fn objectives_completed(&self) -> u32 {
        self.objectives.iter().filter(|o| o.completed).count() as u32
    }

    /// Full marks, challenge done, not a single distraction.
    pub fn is_perfect(&self) -> bool {
        self.phase == ClassPhase::Completed
            && self.evaluation.attention_score == 10
            && self.evaluation.challenge_completed
            && self.distraction_count == 0
    }

    /// Whole minutes between the start of `during` and `now`.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> u32 {
        (now - self.started_at).num_minutes().max(0) as u32
    }
}
