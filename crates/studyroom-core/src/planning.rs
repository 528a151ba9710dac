//! Study sessions planned on a given day for a chapter.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::clock::{new_id, Clock};
use crate::dates;
use crate::outcome::{NoOpReason, Outcome};
use crate::storage::{keys, Persistent, SharedStore};
use crate::subjects::Chapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Planned,
    Completed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningSession {
    pub id: String,
    pub subject_id: String,
    pub chapter_id: String,
    /// Midnight of the planned day.
    pub date: DateTime<Utc>,
    /// Minutes.
    pub duration: u32,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoro_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp_earned: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub subject_id: Option<String>,
    pub chapter_id: Option<String>,
    /// Normalised to midnight.
    pub date: Option<DateTime<Utc>>,
    pub duration: Option<u32>,
    pub status: Option<SessionStatus>,
    pub pomodoro_id: Option<Option<String>>,
}

pub struct PlanningService {
    sessions: Persistent<Vec<PlanningSession>>,
    clock: Rc<dyn Clock>,
}

impl PlanningService {
    pub fn new(store: SharedStore, clock: Rc<dyn Clock>) -> Self {
        Self {
            sessions: Persistent::hydrate(store, keys::PLANNING_SESSIONS, Vec::new()),
            clock,
        }
    }

    pub fn sessions(&self) -> &[PlanningSession] {
        self.sessions.get()
    }

    pub fn session(&self, id: &str) -> Option<&PlanningSession> {
        self.sessions.get().iter().find(|s| s.id == id)
    }

    pub fn by_date(&self, day: DateTime<Utc>) -> Vec<&PlanningSession> {
        self.sessions
            .get()
            .iter()
            .filter(|s| dates::is_same_day(s.date, day))
            .collect()
    }

    /// Sessions on the seven days starting at `week_start`.
    pub fn weekly(&self, week_start: DateTime<Utc>) -> Vec<&PlanningSession> {
        let from = dates::start_of_day(week_start);
        let to = from + Duration::days(7);
        self.sessions
            .get()
            .iter()
            .filter(|s| s.date >= from && s.date < to)
            .collect()
    }

    pub fn create_session(
        &mut self,
        subject_id: &str,
        chapter_id: &str,
        date: DateTime<Utc>,
        duration: u32,
    ) -> PlanningSession {
        let session = planned(subject_id, chapter_id, date, duration);
        self.sessions.update(|all| all.push(session.clone()));
        tracing::debug!(id = %session.id, day = %session.date.date_naive(), "session planned");
        session
    }

    pub fn update_session(&mut self, id: &str, update: SessionUpdate) -> Outcome<PlanningSession> {
        self.with_session(id, |s| {
            if let Some(v) = update.subject_id {
                s.subject_id = v;
            }
            if let Some(v) = update.chapter_id {
                s.chapter_id = v;
            }
            if let Some(v) = update.date {
                s.date = dates::start_of_day(v);
            }
            if let Some(v) = update.duration {
                s.duration = v;
            }
            if let Some(v) = update.status {
                s.status = v;
            }
            if let Some(v) = update.pomodoro_id {
                s.pomodoro_id = v;
            }
            s.clone()
        })
    }

    pub fn delete_session(&mut self, id: &str) -> Outcome<PlanningSession> {
        let Some(pos) = self.sessions.get().iter().position(|s| s.id == id) else {
            return Outcome::NoOp(NoOpReason::not_found("planning session", id));
        };
        Outcome::Applied(self.sessions.update(|all| all.remove(pos)))
    }

    /// A session is completed at most once.
    pub fn mark_completed(&mut self, id: &str, xp: Option<u64>) -> Outcome<PlanningSession> {
        if self
            .session(id)
            .is_some_and(|s| s.status == SessionStatus::Completed)
        {
            return Outcome::NoOp(NoOpReason::AlreadyCompleted);
        }
        let now = self.clock.now();
        self.with_session(id, |s| {
            s.status = SessionStatus::Completed;
            s.completed_at = Some(now);
            s.xp_earned = xp;
            s.clone()
        })
    }

    pub fn mark_skipped(&mut self, id: &str) -> Outcome<PlanningSession> {
        self.with_session(id, |s| {
            s.status = SessionStatus::Skipped;
            s.clone()
        })
    }

    /// Plan one session per chapter, round-robin over the seven days from
    /// `week_start`. The eighth chapter lands on the first day again.
    pub fn auto_distribute(
        &mut self,
        chapters: &[&Chapter],
        week_start: DateTime<Utc>,
        duration: u32,
    ) -> Vec<PlanningSession> {
        let first_day = dates::start_of_day(week_start);
        let created: Vec<PlanningSession> = chapters
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let day = first_day + Duration::days((i % 7) as i64);
                planned(&c.subject_id, &c.id, day, duration)
            })
            .collect();
        self.sessions.update(|all| all.extend(created.iter().cloned()));
        tracing::info!(count = created.len(), "sessions distributed over the week");
        created
    }

    pub fn count_completed(&self) -> u32 {
        self.sessions
            .get()
            .iter()
            .filter(|s| s.status == SessionStatus::Completed)
            .count() as u32
    }

    fn with_session<R>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut PlanningSession) -> R,
    ) -> Outcome<R> {
        if self.session(id).is_none() {
            return Outcome::NoOp(NoOpReason::not_found("planning session", id));
        }
        self.sessions.update(|all| match all.iter_mut().find(|s| s.id == id) {
            Some(s) => Outcome::Applied(f(s)),
            None => Outcome::NoOp(NoOpReason::not_found("planning session", id)),
        })
    }
}

fn planned(subject_id: &str, chapter_id: &str, date: DateTime<Utc>, duration: u32) -> PlanningSession {
    PlanningSession {
        id: new_id(),
        subject_id: subject_id.to_string(),
        chapter_id: chapter_id.to_string(),
        date: dates::start_of_day(date),
        duration,
        status: SessionStatus::Planned,
        completed_at: None,
        pomodoro_id: None,
        xp_earned: None,
    }
}
