//! Pomodoro session state machine.
//!
//! ## State Transitions
//!
//! ```text
//! focus --(remaining hits 0)--> break --(remaining hits 0)--> idle
//!   |  ^                          |  ^
//!   v  | resume                   v  | resume
//!  paused                        paused
//! ```
//!
//! Operates on wall-clock deltas: `last_tick_at` is set while running and
//! each `tick(now)` consumes the whole seconds elapsed since then.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::clock::new_id;
use crate::error::ValidationError;
use crate::events::Event;
use crate::outcome::{NoOpReason, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PomodoroPreset {
    #[default]
    #[serde(rename = "25-5")]
    TwentyFiveFive,
    #[serde(rename = "40-10")]
    FortyTen,
    #[serde(rename = "50-10")]
    FiftyTen,
    #[serde(rename = "custom")]
    Custom,
}

impl PomodoroPreset {
    /// `(focus, break)` minutes. `Custom` falls back to 25/5 unless both
    /// custom durations are given and non-zero.
    pub fn durations(&self, custom: Option<(u32, u32)>) -> (u32, u32) {
        match self {
            PomodoroPreset::TwentyFiveFive => (25, 5),
            PomodoroPreset::FortyTen => (40, 10),
            PomodoroPreset::FiftyTen => (50, 10),
            PomodoroPreset::Custom => match custom {
                Some((f, b)) if f > 0 && b > 0 => (f, b),
                _ => (25, 5),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PomodoroPreset::TwentyFiveFive => "25-5",
            PomodoroPreset::FortyTen => "40-10",
            PomodoroPreset::FiftyTen => "50-10",
            PomodoroPreset::Custom => "custom",
        }
    }
}

impl fmt::Display for PomodoroPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PomodoroPreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "25-5" => Ok(PomodoroPreset::TwentyFiveFive),
            "40-10" => Ok(PomodoroPreset::FortyTen),
            "50-10" => Ok(PomodoroPreset::FiftyTen),
            "custom" => Ok(PomodoroPreset::Custom),
            other => Err(ValidationError::InvalidValue {
                field: "preset".into(),
                message: format!("unknown preset '{other}' (expected 25-5, 40-10, 50-10, custom)"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PomodoroPhase {
    Focus,
    Break,
    Paused,
    Idle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSession {
    pub id: String,
    pub preset: PomodoroPreset,
    /// Minutes.
    pub focus_duration: u32,
    /// Minutes.
    pub break_duration: u32,
    pub current_phase: PomodoroPhase,
    /// Seconds left in the current phase.
    pub remaining_time: u64,
    /// Planning session this pomodoro counts toward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub xp_earned: Option<u64>,
    /// Phase to return to on resume.
    #[serde(default)]
    pub paused_phase: Option<PomodoroPhase>,
    /// Set while the countdown runs.
    #[serde(default)]
    pub last_tick_at: Option<DateTime<Utc>>,
}

impl PomodoroSession {
    /// A running session in `focus`.
    pub fn start(
        preset: PomodoroPreset,
        custom: Option<(u32, u32)>,
        session_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let (focus, brk) = preset.durations(custom);
        Self {
            id: new_id(),
            preset,
            focus_duration: focus,
            break_duration: brk,
            current_phase: PomodoroPhase::Focus,
            remaining_time: u64::from(focus) * 60,
            session_id,
            started_at: Some(now),
            completed_at: None,
            xp_earned: None,
            paused_phase: None,
            last_tick_at: Some(now),
        }
    }

    pub fn is_running(&self) -> bool {
        self.last_tick_at.is_some()
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Outcome<Event> {
        if !self.is_running() {
            return Outcome::NoOp(NoOpReason::NotRunning);
        }
        let mut events = self.tick(now);
        if !self.is_running() {
            // the cycle ran out before the pause landed
            return match events.pop() {
                Some(ev) => Outcome::Applied(ev),
                None => Outcome::NoOp(NoOpReason::NotRunning),
            };
        }
        self.paused_phase = Some(self.current_phase);
        self.current_phase = PomodoroPhase::Paused;
        self.last_tick_at = None;
        Outcome::Applied(Event::PomodoroPaused {
            remaining_secs: self.remaining_time,
            at: now,
        })
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Outcome<Event> {
        if self.current_phase != PomodoroPhase::Paused {
            return Outcome::NoOp(NoOpReason::NotRunning);
        }
        self.current_phase = self.paused_phase.take().unwrap_or(PomodoroPhase::Focus);
        self.last_tick_at = Some(now);
        Outcome::Applied(Event::PomodoroResumed {
            phase: self.current_phase,
            remaining_secs: self.remaining_time,
            at: now,
        })
    }

    /// The focus phase is over: the session reached its break (possibly
    /// paused there), ran out, or has no time left.
    pub fn focus_done(&self) -> bool {
        let phase = match self.current_phase {
            PomodoroPhase::Paused => self.paused_phase.unwrap_or(PomodoroPhase::Focus),
            other => other,
        };
        phase != PomodoroPhase::Focus || self.remaining_time == 0
    }

    /// Stop counting without touching the phase.
    pub fn halt(&mut self) {
        self.last_tick_at = None;
    }

    /// Consume elapsed wall-clock time. Returns the phase changes it caused.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        let Some(last) = self.last_tick_at else {
            return events;
        };
        let elapsed = (now - last).num_seconds().max(0) as u64;
        if elapsed == 0 {
            return events;
        }
        // fractional seconds carry over to the next tick
        self.last_tick_at = Some(last + Duration::seconds(elapsed as i64));

        let mut budget = elapsed;
        while budget > 0 && self.is_running() {
            if budget < self.remaining_time {
                self.remaining_time -= budget;
                break;
            }
            budget -= self.remaining_time;
            match self.current_phase {
                PomodoroPhase::Focus => {
                    self.current_phase = PomodoroPhase::Break;
                    self.remaining_time = u64::from(self.break_duration) * 60;
                    events.push(Event::PomodoroPhaseChanged {
                        from: PomodoroPhase::Focus,
                        to: PomodoroPhase::Break,
                        at: now,
                    });
                }
                _ => {
                    self.current_phase = PomodoroPhase::Idle;
                    self.remaining_time = 0;
                    self.last_tick_at = None;
                    events.push(Event::PomodoroPhaseChanged {
                        from: PomodoroPhase::Break,
                        to: PomodoroPhase::Idle,
                        at: now,
                    });
                }
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap()
    }

    #[test]
    fn preset_durations() {
        assert_eq!(PomodoroPreset::FortyTen.durations(None), (40, 10));
        assert_eq!(PomodoroPreset::Custom.durations(Some((30, 7))), (30, 7));
        assert_eq!(PomodoroPreset::Custom.durations(Some((0, 7))), (25, 5));
        assert_eq!(PomodoroPreset::Custom.durations(None), (25, 5));
    }

    #[test]
    fn preset_parses_from_cli_names() {
        assert_eq!("50-10".parse::<PomodoroPreset>().unwrap(), PomodoroPreset::FiftyTen);
        assert!("10-2".parse::<PomodoroPreset>().is_err());
    }

    #[test]
    fn countdown_consumes_whole_seconds() {
        let mut s = PomodoroSession::start(PomodoroPreset::TwentyFiveFive, None, None, t0());
        assert!(s.tick(t0() + Duration::milliseconds(1500)).is_empty());
        assert_eq!(s.remaining_time, 25 * 60 - 1);
        s.tick(t0() + Duration::milliseconds(2000));
        assert_eq!(s.remaining_time, 25 * 60 - 2);
    }

    #[test]
    fn focus_rolls_into_break_with_spillover() {
        let mut s = PomodoroSession::start(PomodoroPreset::TwentyFiveFive, None, None, t0());
        let events = s.tick(t0() + Duration::seconds(25 * 60 + 10));
        assert_eq!(events.len(), 1);
        assert_eq!(s.current_phase, PomodoroPhase::Break);
        assert_eq!(s.remaining_time, 5 * 60 - 10);
    }

    #[test]
    fn break_end_stops_the_cycle() {
        let mut s = PomodoroSession::start(PomodoroPreset::TwentyFiveFive, None, None, t0());
        let events = s.tick(t0() + Duration::hours(2));
        assert_eq!(events.len(), 2);
        assert_eq!(s.current_phase, PomodoroPhase::Idle);
        assert_eq!(s.remaining_time, 0);
        assert!(!s.is_running());
    }

    #[test]
    fn pause_freezes_and_resume_restores_phase() {
        let mut s = PomodoroSession::start(PomodoroPreset::TwentyFiveFive, None, None, t0());
        s.tick(t0() + Duration::seconds(25 * 60 + 30));
        assert!(s.pause(t0() + Duration::seconds(25 * 60 + 60)).is_applied());
        assert_eq!(s.current_phase, PomodoroPhase::Paused);

        // time passing while paused is not counted
        s.tick(t0() + Duration::hours(1));
        assert_eq!(s.remaining_time, 4 * 60);

        assert!(s.resume(t0() + Duration::hours(1)).is_applied());
        assert_eq!(s.current_phase, PomodoroPhase::Break);
    }

    #[test]
    fn focus_done_only_after_focus_runs_out() {
        let mut s = PomodoroSession::start(PomodoroPreset::TwentyFiveFive, None, None, t0());
        assert!(!s.focus_done());
        s.tick(t0() + Duration::minutes(10));
        s.pause(t0() + Duration::minutes(10));
        assert!(!s.focus_done());

        s.resume(t0() + Duration::minutes(10));
        s.tick(t0() + Duration::minutes(26));
        assert!(s.focus_done());
        s.pause(t0() + Duration::minutes(27));
        assert!(s.focus_done());
    }

    #[test]
    fn resume_when_not_paused_is_noop() {
        let mut s = PomodoroSession::start(PomodoroPreset::FiftyTen, None, None, t0());
        assert_eq!(s.resume(t0()), Outcome::NoOp(NoOpReason::NotRunning));
    }
}
