use std::rc::Rc;

use super::{PomodoroPreset, PomodoroSession, PomodoroStats};
use crate::clock::Clock;
use crate::events::Event;
use crate::outcome::{NoOpReason, Outcome};
use crate::storage::{keys, Persistent, SharedStore};

pub struct PomodoroService {
    current: Persistent<Option<PomodoroSession>>,
    stats: Persistent<PomodoroStats>,
    clock: Rc<dyn Clock>,
}

impl PomodoroService {
    pub fn new(store: SharedStore, clock: Rc<dyn Clock>) -> Self {
        Self {
            current: Persistent::hydrate(store.clone(), keys::CURRENT_POMODORO, None),
            stats: Persistent::hydrate(store, keys::POMODORO_STATS, PomodoroStats::default()),
            clock,
        }
    }

    pub fn current(&self) -> Option<&PomodoroSession> {
        self.current.get().as_ref()
    }

    pub fn stats(&self) -> &PomodoroStats {
        self.stats.get()
    }

    pub fn is_running(&self) -> bool {
        self.current().is_some_and(PomodoroSession::is_running)
    }

    /// Start a fresh session, replacing whatever was there.
    pub fn start(
        &mut self,
        preset: PomodoroPreset,
        session_id: Option<String>,
        custom: Option<(u32, u32)>,
    ) -> Event {
        let now = self.clock.now();
        let session = PomodoroSession::start(preset, custom, session_id, now);
        let event = Event::PomodoroStarted {
            preset,
            focus_min: session.focus_duration,
            break_min: session.break_duration,
            at: now,
        };
        tracing::info!(%preset, focus = session.focus_duration, "pomodoro started");
        self.current.set(Some(session));
        event
    }

    pub fn pause(&mut self) -> Outcome<Event> {
        let now = self.clock.now();
        self.with_session(|s| s.pause(now))
    }

    pub fn resume(&mut self) -> Outcome<Event> {
        let now = self.clock.now();
        self.with_session(|s| s.resume(now))
    }

    /// Advance the countdown to the current time.
    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        if !self.is_running() {
            return Vec::new();
        }
        self.current
            .update(|cur| cur.as_mut().map(|s| s.tick(now)).unwrap_or_default())
    }

    /// Discard the current session.
    pub fn stop(&mut self) -> Outcome<Event> {
        if self.current().is_none() {
            return Outcome::NoOp(NoOpReason::NoActiveSession);
        }
        self.current.set(None);
        Outcome::Applied(Event::PomodoroStopped {
            at: self.clock.now(),
        })
    }

    /// Count the current session as done and update the day streak.
    ///
    /// Only once per session, and only after its focus phase has run out.
    pub fn complete(&mut self, xp: Option<u64>) -> Outcome<PomodoroStats> {
        match self.current() {
            None => return Outcome::NoOp(NoOpReason::NoActiveSession),
            Some(s) if s.completed_at.is_some() => {
                return Outcome::NoOp(NoOpReason::AlreadyCompleted)
            }
            Some(_) => {}
        }
        self.tick();
        if let Some(s) = self.current().filter(|s| !s.focus_done()) {
            return Outcome::NoOp(NoOpReason::FocusNotFinished {
                remaining_secs: s.remaining_time,
            });
        }
        let now = self.clock.now();
        self.stats.update(|s| s.record_completion(now));
        self.current.update(|cur| {
            if let Some(s) = cur.as_mut() {
                s.completed_at = Some(now);
                s.xp_earned = xp;
                s.halt();
            }
        });
        Outcome::Applied(self.stats.get().clone())
    }

    fn with_session(
        &mut self,
        f: impl FnOnce(&mut PomodoroSession) -> Outcome<Event>,
    ) -> Outcome<Event> {
        if self.current().is_none() {
            return Outcome::NoOp(NoOpReason::NoActiveSession);
        }
        self.current.update(|cur| match cur.as_mut() {
            Some(s) => f(s),
            None => Outcome::NoOp(NoOpReason::NoActiveSession),
        })
    }
}
