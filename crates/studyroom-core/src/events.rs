use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::class_mode::ClassPhase;
use crate::pomodoro::{PomodoroPhase, PomodoroPreset};

/// Notable state changes. Front ends print or render them; nothing in the
/// core depends on them being observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PomodoroStarted {
        preset: PomodoroPreset,
        focus_min: u32,
        break_min: u32,
        at: DateTime<Utc>,
    },
    PomodoroPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    PomodoroResumed {
        phase: PomodoroPhase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Focus ran out and the break began, or the break ran out.
    PomodoroPhaseChanged {
        from: PomodoroPhase,
        to: PomodoroPhase,
        at: DateTime<Utc>,
    },
    PomodoroStopped {
        at: DateTime<Utc>,
    },
    ClassPhaseChanged {
        session_id: String,
        from: ClassPhase,
        to: ClassPhase,
        at: DateTime<Utc>,
    },
    ClassCancelled {
        session_id: String,
        at: DateTime<Utc>,
    },
    XpGained {
        amount: u64,
        total: u64,
        reason: Option<String>,
    },
    LevelUp {
        old_level: u64,
        new_level: u64,
    },
    BadgeUnlocked {
        id: String,
        name: String,
        at: DateTime<Utc>,
    },
}
