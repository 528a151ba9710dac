//! All services over one store, plus the rewards that span several of them.

use serde::Serialize;
use std::rc::Rc;

use crate::class_mode::{ClassCompletion, ClassModeService};
use crate::clock::Clock;
use crate::error::{StorageError, ValidationError};
use crate::events::Event;
use crate::gamification::badges::BadgeContext;
use crate::gamification::{ProgressService, Stat, XpReward};
use crate::goals::GoalService;
use crate::outcome::{NoOpReason, Outcome};
use crate::planning::{PlanningService, PlanningSession};
use crate::pomodoro::{PomodoroService, PomodoroStats};
use crate::storage::{keys, Config, SharedStore};
use crate::subjects::{Mastery, SubjectService};
use crate::tasks::TaskService;

/// A completed action together with the XP, level and badge events it
/// triggered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rewarded<T> {
    pub value: T,
    pub events: Vec<Event>,
}

pub struct Studyroom {
    pub subjects: SubjectService,
    pub tasks: TaskService,
    pub goals: GoalService,
    pub planning: PlanningService,
    pub pomodoro: PomodoroService,
    pub class_mode: ClassModeService,
    pub progress: ProgressService,
    store: SharedStore,
    config: Config,
}

impl Studyroom {
    pub fn open(store: SharedStore, clock: Rc<dyn Clock>, config: Config) -> Self {
        Self {
            subjects: SubjectService::new(store.clone(), clock.clone()),
            tasks: TaskService::new(store.clone(), clock.clone()),
            goals: GoalService::new(store.clone(), clock.clone())
                .with_default_color(config.goals.default_color.clone()),
            planning: PlanningService::new(store.clone(), clock.clone()),
            pomodoro: PomodoroService::new(store.clone(), clock.clone()),
            class_mode: ClassModeService::new(store.clone(), clock.clone())
                .with_default_attention(config.class_mode.default_attention_level),
            progress: ProgressService::new(store.clone(), clock),
            store,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the counters the badge catalog is judged on.
    pub fn badge_context(&self) -> BadgeContext {
        let pomodoro = self.pomodoro.stats();
        let class = self.class_mode.stats();
        BadgeContext {
            pomodoro_count: pomodoro.total_completed,
            session_count: self.planning.count_completed(),
            class_count: class.total_sessions,
            mastery5_count: self.subjects.count_mastered_chapters(),
            streak: self.progress.progress().streaks.current,
            class_best_attention: u32::from(class.best_attention_score),
            class_zero_distraction_count: class.total_distractions_avoided,
            class_streak: class.current_streak,
            class_challenges_completed: class.challenges_completed,
            class_perfect_count: self.class_mode.perfect_count(),
        }
    }

    /// Unlock whatever the current counters qualify for.
    pub fn check_badges(&mut self) -> Vec<Event> {
        let ctx = self.badge_context();
        self.progress
            .check_and_unlock(ctx)
            .iter()
            .flat_map(|u| u.events())
            .collect()
    }

    /// Complete the running pomodoro: +10 XP, one more pomodoro and its
    /// focus minutes on the lifetime counters.
    pub fn complete_pomodoro(&mut self) -> Outcome<Rewarded<PomodoroStats>> {
        let Some(focus) = self.pomodoro.current().map(|s| s.focus_duration) else {
            return Outcome::NoOp(NoOpReason::NoActiveSession);
        };
        let reward = XpReward::POMODORO_COMPLETED;
        self.pomodoro.complete(Some(reward)).map(|stats| {
            let events = self.reward(reward, "Pomodoro completed", |p| {
                p.increment_stat(Stat::Pomodoros, 1);
                p.increment_stat(Stat::MinutesStudied, u64::from(focus));
            });
            Rewarded { value: stats, events }
        })
    }

    /// Mark a planned session done: +15 XP and one more session.
    pub fn complete_planning_session(&mut self, id: &str) -> Outcome<Rewarded<PlanningSession>> {
        let reward = XpReward::SESSION_COMPLETED;
        self.planning
            .mark_completed(id, Some(reward))
            .map(|session| {
                let events = self.reward(reward, "Session completed", |p| {
                    p.increment_stat(Stat::Sessions, 1);
                });
                Rewarded {
                    value: session,
                    events,
                }
            })
    }

    /// Finish the active class and award its XP and minutes.
    pub fn complete_class(
        &mut self,
        attention_score: u8,
        summary: &str,
        to_review: &str,
        challenge_completed: bool,
    ) -> Result<Outcome<Rewarded<ClassCompletion>>, ValidationError> {
        let outcome = self.class_mode.complete_class(
            attention_score,
            summary,
            to_review,
            challenge_completed,
        )?;
        Ok(outcome.map(|completion| {
            let minutes = u64::from(completion.session.duration);
            let events = self.reward(completion.xp, "Class completed", |p| {
                p.increment_stat(Stat::ClassSessions, 1);
                p.increment_stat(Stat::MinutesStudied, minutes);
            });
            Rewarded {
                value: completion,
                events,
            }
        }))
    }

    /// Set a chapter's mastery. Each level gained is worth
    /// [`XpReward::CHAPTER_MASTERY_UP`]; lowering it is free.
    pub fn set_chapter_mastery(
        &mut self,
        subject_id: &str,
        chapter_id: &str,
        mastery: Mastery,
    ) -> Outcome<Rewarded<Mastery>> {
        self.subjects
            .set_mastery(subject_id, chapter_id, mastery)
            .map(|previous| {
                let gained = u64::from(mastery.get().saturating_sub(previous.get()));
                let mut events = Vec::new();
                if gained > 0 {
                    let gain = self
                        .progress
                        .add_xp(gained * XpReward::CHAPTER_MASTERY_UP, Some("Chapter mastery up"));
                    events.extend(gain.events());
                }
                events.extend(self.check_badges());
                Rewarded {
                    value: mastery,
                    events,
                }
            })
    }

    /// Delete every stored application document.
    pub fn reset_data(&self) -> Result<usize, StorageError> {
        let removed = self.store.clear_prefixed(keys::APP_PREFIX)?;
        tracing::info!(removed, prefix = keys::APP_PREFIX, "stored data cleared");
        Ok(removed)
    }

    /// XP, counters, the daily streak, then a badge check.
    fn reward(
        &mut self,
        amount: u64,
        reason: &str,
        counters: impl FnOnce(&mut ProgressService),
    ) -> Vec<Event> {
        let mut events = self.progress.add_xp(amount, Some(reason)).events();
        counters(&mut self.progress);
        if let Some(streak) = self.progress.record_activity() {
            events.extend(streak.events());
        }
        events.extend(self.check_badges());
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::pomodoro::PomodoroPreset;
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::subjects::NewChapter;
    use chrono::{Duration, TimeZone, Utc};

    fn setup() -> (Studyroom, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 11, 4, 9, 0, 0).unwrap(),
        ));
        let store: SharedStore = Rc::new(MemoryStore::new());
        (Studyroom::open(store, clock.clone(), Config::default()), clock)
    }

    #[test]
    fn first_pomodoro_unlocks_badge() {
        let (mut app, clock) = setup();
        app.pomodoro.start(PomodoroPreset::TwentyFiveFive, None, None);
        clock.advance(Duration::minutes(25));
        app.pomodoro.tick();

        let done = app.complete_pomodoro().applied().unwrap();
        assert_eq!(done.value.total_completed, 1);
        assert!(done
            .events
            .iter()
            .any(|e| matches!(e, Event::BadgeUnlocked { id, .. } if id == "first_pomodoro")));

        let p = app.progress.progress();
        // 10 pomodoro + 5 streak day + 25 badge
        assert_eq!(p.xp.total_xp, 40);
        assert_eq!(p.statistics.total_pomodoros, 1);
        assert_eq!(p.statistics.total_minutes_studied, 25);
    }

    #[test]
    fn pomodoro_pays_out_once_and_only_after_focus() {
        let (mut app, clock) = setup();
        app.pomodoro.start(PomodoroPreset::TwentyFiveFive, None, None);
        assert_eq!(
            app.complete_pomodoro().reason(),
            Some(&NoOpReason::FocusNotFinished {
                remaining_secs: 25 * 60
            })
        );

        clock.advance(Duration::minutes(25));
        assert!(app.complete_pomodoro().is_applied());
        let xp = app.progress.progress().xp.total_xp;
        assert_eq!(
            app.complete_pomodoro().reason(),
            Some(&NoOpReason::AlreadyCompleted)
        );

        let p = app.progress.progress();
        assert_eq!(p.xp.total_xp, xp);
        assert_eq!(p.statistics.total_pomodoros, 1);
        assert_eq!(app.pomodoro.stats().total_completed, 1);
    }

    #[test]
    fn planning_session_pays_out_once() {
        let (mut app, clock) = setup();
        let session = app.planning.create_session("s", "c", clock.now(), 30);
        assert!(app.complete_planning_session(&session.id).is_applied());
        let xp = app.progress.progress().xp.total_xp;
        assert_eq!(
            app.complete_planning_session(&session.id).reason(),
            Some(&NoOpReason::AlreadyCompleted)
        );
        assert_eq!(app.progress.progress().xp.total_xp, xp);
        assert_eq!(app.progress.progress().statistics.total_sessions, 1);
    }

    #[test]
    fn completing_nothing_awards_nothing() {
        let (mut app, _) = setup();
        assert!(!app.complete_pomodoro().is_applied());
        assert!(!app.complete_planning_session("none").is_applied());
        assert_eq!(app.progress.progress().xp.total_xp, 0);
    }

    #[test]
    fn mastery_up_is_paid_per_level() {
        let (mut app, _) = setup();
        let s = app.subjects.create_subject("Maths", "#123", None).unwrap();
        let c = app
            .subjects
            .add_chapter(&s.id, NewChapter::new("Series"))
            .unwrap()
            .applied()
            .unwrap();
        let out = app
            .set_chapter_mastery(&s.id, &c.id, Mastery::new(2).unwrap())
            .applied()
            .unwrap();
        assert_eq!(out.value.get(), 2);
        assert_eq!(app.progress.progress().xp.total_xp, 40);

        app.set_chapter_mastery(&s.id, &c.id, Mastery::new(1).unwrap());
        assert_eq!(app.progress.progress().xp.total_xp, 40);

        app.set_chapter_mastery(&s.id, &c.id, Mastery::MAX);
        // +4 levels, then first_mastery
        assert_eq!(app.progress.progress().xp.total_xp, 40 + 80 + 25);
    }

    #[test]
    fn reset_clears_everything() {
        let (mut app, _) = setup();
        app.subjects.create_subject("Art", "#abcdef", None).unwrap();
        app.tasks
            .create_task("Sketch", Default::default(), Default::default())
            .unwrap();
        assert!(app.reset_data().unwrap() >= 2);
        for key in keys::ALL {
            assert!(!app.store.has(key).unwrap(), "{key} survived");
        }
    }
}
