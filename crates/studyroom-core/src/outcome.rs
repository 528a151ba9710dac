//! Explicit result of a service operation.
//!
//! Operations whose precondition is not met (no active session, wrong phase,
//! unknown id) do nothing and say why, instead of failing or silently
//! succeeding.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::class_mode::ClassPhase;

/// Why an operation left state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoOpReason {
    NoActiveSession,
    WrongPhase {
        expected: ClassPhase,
        actual: ClassPhase,
    },
    NotFound {
        entity: String,
        id: String,
    },
    AlreadyUnlocked {
        id: String,
    },
    AlreadyLinked,
    NotRunning,
    AlreadyCompleted,
    FocusNotFinished {
        remaining_secs: u64,
    },
}

impl NoOpReason {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        NoOpReason::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoOpReason::NoActiveSession => write!(f, "no active session"),
            NoOpReason::WrongPhase { expected, actual } => {
                write!(f, "session is in phase '{actual}', expected '{expected}'")
            }
            NoOpReason::NotFound { entity, id } => write!(f, "{entity} '{id}' not found"),
            NoOpReason::AlreadyUnlocked { id } => write!(f, "badge '{id}' already unlocked"),
            NoOpReason::AlreadyLinked => write!(f, "already linked"),
            NoOpReason::NotRunning => write!(f, "nothing is running"),
            NoOpReason::AlreadyCompleted => write!(f, "already completed"),
            NoOpReason::FocusNotFinished { remaining_secs } => {
                write!(f, "focus phase still running ({remaining_secs}s left)")
            }
        }
    }
}

/// Either the operation was applied and produced a value, or it was a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Applied(T),
    NoOp(NoOpReason),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(v) => Some(v),
            Outcome::NoOp(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&NoOpReason> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::NoOp(r) => Some(r),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Applied(v) => Outcome::Applied(f(v)),
            Outcome::NoOp(r) => Outcome::NoOp(r),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Applied(v) => f(v),
            Outcome::NoOp(r) => Outcome::NoOp(r),
        }
    }
}
