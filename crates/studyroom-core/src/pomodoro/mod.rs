//! Pomodoro timer.
//!
//! [`PomodoroSession`] is a wall-clock driven phase machine
//! (`focus -> break -> idle`, with `paused` in between); the caller invokes
//! `tick()` periodically. [`PomodoroService`] persists the current session and
//! the day-based completion streak.

mod service;
mod session;
mod stats;

pub use service::PomodoroService;
pub use session::{PomodoroPhase, PomodoroPreset, PomodoroSession};
pub use stats::PomodoroStats;
