//! Class mode: a guided before/during/after flow around one class.

pub mod challenge;
mod service;
mod session;
mod stats;

pub use service::{ClassCompletion, ClassModeService};
pub use session::{
    ClassEvaluation, ClassObjective, ClassPhase, ClassSession, MicroChallenge, ObjectiveType,
};
pub use stats::ClassModeStats;
