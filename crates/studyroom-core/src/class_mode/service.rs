//! Class session state machine.
//!
//! Every operation reports what happened through [`Outcome`]. Acting without
//! an active session, or in a phase the operation does not belong to, is a
//! no-op with a reason; nothing is mutated.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::Serialize;
use std::rc::Rc;

use super::challenge::random_challenge;
use super::{ClassEvaluation, ClassModeStats, ClassObjective, ClassPhase, ClassSession, MicroChallenge};
use crate::clock::Clock;
use crate::error::ValidationError;
use crate::events::Event;
use crate::gamification::xp::class_xp;
use crate::outcome::{NoOpReason, Outcome};
use crate::storage::{keys, Persistent, SharedStore};

const MAX_ATTENTION_LEVEL: i32 = 5;
const MAX_ATTENTION_SCORE: u8 = 10;
const DEFAULT_ATTENTION_LEVEL: u8 = 3;

/// Result of a successful `complete_class`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCompletion {
    pub session: ClassSession,
    pub stats: ClassModeStats,
    pub xp: u64,
}

pub struct ClassModeService {
    active: Persistent<Option<ClassSession>>,
    history: Persistent<Vec<ClassSession>>,
    stats: Persistent<ClassModeStats>,
    clock: Rc<dyn Clock>,
    rng: Pcg64,
    default_attention: u8,
}

impl ClassModeService {
    pub fn new(store: SharedStore, clock: Rc<dyn Clock>) -> Self {
        Self {
            active: Persistent::hydrate(store.clone(), keys::ACTIVE_CLASS_SESSION, None),
            history: Persistent::hydrate(store.clone(), keys::CLASS_SESSIONS, Vec::new()),
            stats: Persistent::hydrate(store, keys::CLASS_STATS, ClassModeStats::default()),
            clock,
            rng: Pcg64::from_entropy(),
            default_attention: DEFAULT_ATTENTION_LEVEL,
        }
    }

    /// Use a fixed seed for challenge selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg64::seed_from_u64(seed);
        self
    }

    pub fn with_default_attention(mut self, level: u8) -> Self {
        self.default_attention = level.min(MAX_ATTENTION_LEVEL as u8);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn active(&self) -> Option<&ClassSession> {
        self.active.get().as_ref()
    }

    pub fn stats(&self) -> &ClassModeStats {
        self.stats.get()
    }

    /// Archived sessions that reached `completed`.
    pub fn session_history(&self) -> Vec<&ClassSession> {
        self.history
            .get()
            .iter()
            .filter(|s| s.phase == ClassPhase::Completed)
            .collect()
    }

    /// Counters derived from history rather than accumulated.
    pub fn recompute_stats(&self) -> ClassModeStats {
        ClassModeStats::from_history(self.history.get())
    }

    pub fn perfect_count(&self) -> u32 {
        self.history.get().iter().filter(|s| s.is_perfect()).count() as u32
    }

    /// Minutes since the class started; what a front end shows while in
    /// `during`.
    pub fn elapsed_minutes(&self) -> Outcome<u32> {
        let now = self.clock.now();
        match self.active() {
            None => Outcome::NoOp(NoOpReason::NoActiveSession),
            Some(s) if s.phase != ClassPhase::During => Outcome::NoOp(NoOpReason::WrongPhase {
                expected: ClassPhase::During,
                actual: s.phase,
            }),
            Some(s) => Outcome::Applied(s.elapsed_minutes(now)),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open a new session in `before` with a freshly drawn challenge.
    /// An existing active session is replaced.
    pub fn start(&mut self, subject_id: &str, chapter_id: &str) -> ClassSession {
        if let Some(prev) = self.active() {
            tracing::warn!(session = %prev.id, phase = %prev.phase, "replacing active class session");
        }
        let challenge = random_challenge(&mut self.rng);
        let session = ClassSession::new(
            subject_id,
            chapter_id,
            challenge,
            self.default_attention,
            self.clock.now(),
        );
        tracing::info!(session = %session.id, subject_id, chapter_id, "class session started");
        self.active.set(Some(session.clone()));
        session
    }

    pub fn set_objectives(&mut self, objectives: Vec<ClassObjective>) -> Outcome<()> {
        self.mutate(None, |s| {
            s.objectives = objectives;
        })
    }

    pub fn add_objective(&mut self, objective: ClassObjective) -> Outcome<()> {
        self.mutate(None, |s| s.objectives.push(objective))
    }

    pub fn set_challenge(&mut self, challenge: MicroChallenge) -> Outcome<()> {
        self.mutate(None, |s| {
            s.challenge = challenge;
        })
    }

    /// Draw another challenge while still in `before`.
    pub fn reroll_challenge(&mut self) -> Outcome<MicroChallenge> {
        let challenge = random_challenge(&mut self.rng);
        self.mutate(Some(ClassPhase::Before), |s| {
            s.challenge = challenge.clone();
            challenge
        })
    }

    /// `before -> during`; restarts the clock.
    pub fn enter_during(&mut self) -> Outcome<Event> {
        let now = self.clock.now();
        self.mutate(Some(ClassPhase::Before), |s| {
            s.phase = ClassPhase::During;
            s.started_at = now;
            phase_changed(s, ClassPhase::Before, now)
        })
    }

    /// Clamp to 0..=5 and store. Returns the stored level.
    pub fn update_attention(&mut self, level: i32) -> Outcome<u8> {
        let level = level.clamp(0, MAX_ATTENTION_LEVEL) as u8;
        self.mutate(Some(ClassPhase::During), |s| {
            s.attention_level = level;
            level
        })
    }

    pub fn add_distraction(&mut self) -> Outcome<u32> {
        self.mutate(Some(ClassPhase::During), |s| {
            s.distraction_count += 1;
            s.distraction_count
        })
    }

    pub fn add_quick_note(&mut self, note: impl Into<String>) -> Outcome<usize> {
        let note = note.into();
        self.mutate(Some(ClassPhase::During), |s| {
            s.quick_notes.push(note);
            s.quick_notes.len()
        })
    }

    /// `during -> after`. Freezes the duration in whole minutes.
    pub fn end_class(&mut self) -> Outcome<u32> {
        let now = self.clock.now();
        let outcome = self.mutate(Some(ClassPhase::During), |s| {
            s.duration = s.elapsed_minutes(now);
            s.phase = ClassPhase::After;
            s.duration
        });
        if let Outcome::Applied(minutes) = &outcome {
            tracing::info!(minutes, "class ended");
        }
        outcome
    }

    /// `after -> completed`: evaluate, fold into stats, archive, clear.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `attention_score` is above 10; nothing
    /// changes in that case.
    pub fn complete_class(
        &mut self,
        attention_score: u8,
        summary: &str,
        to_review: &str,
        challenge_completed: bool,
    ) -> Result<Outcome<ClassCompletion>, ValidationError> {
        if attention_score > MAX_ATTENTION_SCORE {
            return Err(ValidationError::OutOfRange {
                field: "attention_score".into(),
                value: i64::from(attention_score),
                min: 0,
                max: i64::from(MAX_ATTENTION_SCORE),
            });
        }
        let mut session = match self.require(Some(ClassPhase::After)) {
            Ok(s) => s.clone(),
            Err(reason) => return Ok(Outcome::NoOp(reason)),
        };

        let now = self.clock.now();
        let objectives_completed = session.objectives_completed();
        session.phase = ClassPhase::Completed;
        session.challenge.completed = challenge_completed;
        session.evaluation = ClassEvaluation {
            attention_score,
            summary: summary.to_string(),
            to_review: to_review.to_string(),
            challenge_completed,
            objectives_completed,
        };
        session.completed_at = Some(now);
        let xp = class_xp(
            attention_score,
            session.distraction_count,
            challenge_completed,
            objectives_completed,
        );
        session.xp_earned = Some(xp);

        self.stats.update(|st| st.record(&session));
        self.history.update(|h| h.push(session.clone()));
        self.active.set(None);

        tracing::info!(
            session = %session.id,
            attention_score,
            xp,
            "class completed"
        );
        Ok(Outcome::Applied(ClassCompletion {
            session,
            stats: self.stats.get().clone(),
            xp,
        }))
    }

    /// Discard the session from `during`. History and stats are untouched.
    pub fn cancel_session(&mut self) -> Outcome<Event> {
        let id = match self.require(Some(ClassPhase::During)) {
            Ok(s) => s.id.clone(),
            Err(reason) => return Outcome::NoOp(reason),
        };
        self.active.set(None);
        tracing::info!(session = %id, "class session cancelled");
        Outcome::Applied(Event::ClassCancelled {
            session_id: id,
            at: self.clock.now(),
        })
    }

    /// Flip one objective. Returns its new state.
    pub fn toggle_objective(&mut self, objective_id: &str) -> Outcome<bool> {
        let found = self
            .active()
            .map(|s| s.objectives.iter().any(|o| o.id == objective_id));
        match found {
            None => Outcome::NoOp(NoOpReason::NoActiveSession),
            Some(false) => Outcome::NoOp(NoOpReason::not_found("objective", objective_id)),
            Some(true) => self.mutate(None, |s| {
                let mut flag = false;
                for o in s.objectives.iter_mut().filter(|o| o.id == objective_id) {
                    o.completed = !o.completed;
                    flag = o.completed;
                }
                flag
            }),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require(&self, phase: Option<ClassPhase>) -> Result<&ClassSession, NoOpReason> {
        let session = self.active().ok_or(NoOpReason::NoActiveSession)?;
        match phase {
            Some(expected) if session.phase != expected => Err(NoOpReason::WrongPhase {
                expected,
                actual: session.phase,
            }),
            _ => Ok(session),
        }
    }

    /// Apply `f` to the active session if it exists (and is in `phase`, when
    /// given), then write through.
    fn mutate<R>(
        &mut self,
        phase: Option<ClassPhase>,
        f: impl FnOnce(&mut ClassSession) -> R,
    ) -> Outcome<R> {
        if let Err(reason) = self.require(phase) {
            return Outcome::NoOp(reason);
        }
        let r = self.active.update(|active| active.as_mut().map(f));
        match r {
            Some(r) => Outcome::Applied(r),
            None => Outcome::NoOp(NoOpReason::NoActiveSession),
        }
    }
}

fn phase_changed(s: &ClassSession, from: ClassPhase, at: DateTime<Utc>) -> Event {
    tracing::info!(session = %s.id, %from, to = %s.phase, "class phase changed");
    Event::ClassPhaseChanged {
        session_id: s.id.clone(),
        from,
        to: s.phase,
        at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_mode::ObjectiveType;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn setup() -> (ClassModeService, Rc<ManualClock>, SharedStore) {
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap(),
        ));
        let store: SharedStore = Rc::new(MemoryStore::new());
        let svc = ClassModeService::new(store.clone(), clock.clone()).with_seed(1);
        (svc, clock, store)
    }

    fn in_during(svc: &mut ClassModeService) {
        svc.start("maths", "limits");
        svc.enter_during();
    }

    #[test]
    fn start_creates_before_session() {
        let (mut svc, _, _) = setup();
        let s = svc.start("maths", "limits");
        assert_eq!(s.phase, ClassPhase::Before);
        assert!(s.objectives.is_empty());
        assert_eq!(s.distraction_count, 0);
        assert_eq!(s.attention_level, 3);
        assert!(!s.challenge.description.is_empty());
    }

    #[test]
    fn attention_is_clamped() {
        let (mut svc, _, _) = setup();
        in_during(&mut svc);
        assert_eq!(svc.update_attention(7), Outcome::Applied(5));
        assert_eq!(svc.active().unwrap().attention_level, 5);
        assert_eq!(svc.update_attention(-2), Outcome::Applied(0));
    }

    #[test]
    fn attention_outside_during_is_noop() {
        let (mut svc, _, _) = setup();
        svc.start("maths", "limits");
        let outcome = svc.update_attention(1);
        assert_eq!(
            outcome,
            Outcome::NoOp(NoOpReason::WrongPhase {
                expected: ClassPhase::During,
                actual: ClassPhase::Before
            })
        );
        assert_eq!(svc.active().unwrap().attention_level, 3);
    }

    #[test]
    fn distraction_before_during_has_no_effect() {
        let (mut svc, _, _) = setup();
        svc.start("maths", "limits");
        assert!(!svc.add_distraction().is_applied());
        assert_eq!(svc.active().unwrap().distraction_count, 0);
    }

    #[test]
    fn notes_only_during() {
        let (mut svc, _, _) = setup();
        svc.start("maths", "limits");
        assert!(!svc.add_quick_note("too early").is_applied());
        svc.enter_during();
        assert_eq!(svc.add_quick_note("epsilon-delta"), Outcome::Applied(1));
        svc.end_class();
        assert!(!svc.add_quick_note("too late").is_applied());
        assert_eq!(svc.active().unwrap().quick_notes, vec!["epsilon-delta"]);
    }

    #[test]
    fn end_class_freezes_floor_minutes() {
        let (mut svc, clock, _) = setup();
        in_during(&mut svc);
        clock.advance(Duration::seconds(55 * 60 + 59));
        assert_eq!(svc.end_class(), Outcome::Applied(55));
        clock.advance(Duration::hours(3));
        assert_eq!(svc.active().unwrap().duration, 55);
        assert_eq!(svc.active().unwrap().phase, ClassPhase::After);
    }

    #[test]
    fn enter_during_twice_is_noop() {
        let (mut svc, _, _) = setup();
        in_during(&mut svc);
        assert!(!svc.enter_during().is_applied());
    }

    #[test]
    fn operations_without_session_are_noops() {
        let (mut svc, _, _) = setup();
        assert_eq!(svc.set_objectives(vec![]), Outcome::NoOp(NoOpReason::NoActiveSession));
        assert_eq!(svc.add_distraction(), Outcome::NoOp(NoOpReason::NoActiveSession));
        assert_eq!(svc.end_class(), Outcome::NoOp(NoOpReason::NoActiveSession));
        assert_eq!(svc.toggle_objective("x"), Outcome::NoOp(NoOpReason::NoActiveSession));
        assert!(!svc.cancel_session().is_applied());
    }

    #[test]
    fn toggle_objective_flips_and_reports_missing() {
        let (mut svc, _, _) = setup();
        svc.start("maths", "limits");
        let objective = ClassObjective::new(ObjectiveType::Participation, "Answer once");
        let id = objective.id.clone();
        svc.set_objectives(vec![objective]);

        assert_eq!(svc.toggle_objective(&id), Outcome::Applied(true));
        assert_eq!(svc.toggle_objective(&id), Outcome::Applied(false));
        assert!(matches!(
            svc.toggle_objective("nope"),
            Outcome::NoOp(NoOpReason::NotFound { .. })
        ));
    }

    #[test]
    fn complete_archives_and_updates_stats() {
        let (mut svc, clock, _) = setup();
        svc.start("maths", "limits");
        let o1 = ClassObjective::new(ObjectiveType::Notes, "Notes");
        let o2 = ClassObjective::new(ObjectiveType::Concentration, "Focus");
        let o1_id = o1.id.clone();
        svc.set_objectives(vec![o1, o2]);
        svc.enter_during();
        svc.toggle_objective(&o1_id);
        clock.advance(Duration::minutes(50));
        svc.end_class();

        let done = svc
            .complete_class(9, "limits", "l'Hopital", true)
            .unwrap()
            .applied()
            .unwrap();

        assert_eq!(done.session.phase, ClassPhase::Completed);
        assert_eq!(done.session.evaluation.objectives_completed, 1);
        assert_eq!(done.stats.total_sessions, 1);
        assert_eq!(done.stats.total_distractions_avoided, 1);
        assert_eq!(done.stats.challenges_completed, 1);
        // 50 + 27 + 20 + 10 + 15 + 10
        assert_eq!(done.xp, 132);
        assert!(svc.active().is_none());
        assert_eq!(svc.session_history().len(), 1);
        assert_eq!(svc.recompute_stats(), *svc.stats());
    }

    #[test]
    fn one_distraction_leaves_avoided_counter() {
        let (mut svc, _, _) = setup();
        in_during(&mut svc);
        svc.add_distraction();
        svc.end_class();
        let done = svc.complete_class(5, "", "", false).unwrap().applied().unwrap();
        assert_eq!(done.stats.total_distractions_avoided, 0);
    }

    #[test]
    fn complete_requires_after() {
        let (mut svc, _, _) = setup();
        in_during(&mut svc);
        let outcome = svc.complete_class(8, "", "", false).unwrap();
        assert!(!outcome.is_applied());
        assert_eq!(svc.stats().total_sessions, 0);
    }

    #[test]
    fn complete_rejects_score_above_ten() {
        let (mut svc, _, _) = setup();
        in_during(&mut svc);
        svc.end_class();
        assert!(svc.complete_class(11, "", "", false).is_err());
        assert_eq!(svc.active().unwrap().phase, ClassPhase::After);
    }

    #[test]
    fn cancel_from_during_leaves_no_trace() {
        let (mut svc, _, store) = setup();
        in_during(&mut svc);
        svc.add_distraction();
        let stats_before = svc.stats().clone();

        assert!(svc.cancel_session().is_applied());
        assert!(svc.active().is_none());
        assert_eq!(*svc.stats(), stats_before);
        assert!(svc.session_history().is_empty());

        let clock = Rc::new(ManualClock::new(Utc::now()));
        let reloaded = ClassModeService::new(store, clock);
        assert!(reloaded.active().is_none());
        assert!(reloaded.session_history().is_empty());
    }

    #[test]
    fn cancel_outside_during_is_noop() {
        let (mut svc, _, _) = setup();
        svc.start("maths", "limits");
        assert!(!svc.cancel_session().is_applied());
        assert!(svc.active().is_some());
    }

    #[test]
    fn perfect_class_is_counted() {
        let (mut svc, _, _) = setup();
        in_during(&mut svc);
        svc.end_class();
        svc.complete_class(10, "", "", true).unwrap();
        assert_eq!(svc.perfect_count(), 1);
    }

    #[test]
    fn reroll_only_before() {
        let (mut svc, _, _) = setup();
        svc.start("maths", "limits");
        assert!(svc.reroll_challenge().is_applied());
        svc.enter_during();
        assert!(!svc.reroll_challenge().is_applied());
    }
}
