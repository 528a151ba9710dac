//! # Studyroom Core Library
//!
//! Business logic for a single-user study companion: subjects and chapters,
//! tasks, goals, planned study sessions, a pomodoro timer, a guided class
//! mode, and an XP/badge layer on top of them.
//!
//! ## Architecture
//!
//! - **Storage**: every service owns one or more [`storage::Persistent`]
//!   documents mirrored to a key-value store (SQLite on disk, or memory)
//! - **Services**: plain structs operating on their documents. Operations
//!   whose precondition does not hold return [`Outcome::NoOp`] with a reason
//! - **Time**: services read the time from a [`Clock`], so they can be
//!   driven by a [`ManualClock`] in tests
//! - **Orchestration**: [`Studyroom`] wires the services together and applies
//!   the cross-service rewards (XP, lifetime counters, badge checks)

pub mod class_mode;
pub mod clock;
pub mod dates;
pub mod demo;
pub mod error;
pub mod events;
pub mod gamification;
pub mod goals;
pub mod outcome;
pub mod planning;
pub mod pomodoro;
pub mod stats;
pub mod storage;
pub mod subjects;
pub mod tasks;

mod app;

pub use app::{Rewarded, Studyroom};
pub use class_mode::{ClassModeService, ClassPhase, ClassSession};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use gamification::{ProgressService, UserProgress, XpSystem};
pub use goals::{Goal, GoalService};
pub use outcome::{NoOpReason, Outcome};
pub use planning::{PlanningService, PlanningSession};
pub use pomodoro::{PomodoroService, PomodoroSession};
pub use stats::StudyStats;
pub use storage::{Config, Database, KeyValueStore, MemoryStore, SharedStore};
pub use subjects::{Chapter, Subject, SubjectService};
pub use tasks::{Task, TaskService};
