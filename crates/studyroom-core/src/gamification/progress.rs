use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use super::badges::{self, Badge, BadgeContext, BadgeDefinition};
use super::xp::{XpReward, XpSystem};
use crate::clock::Clock;
use crate::events::Event;
use crate::outcome::{NoOpReason, Outcome};
use crate::storage::{keys, Persistent, SharedStore};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
    #[serde(default)]
    pub last_activity_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_minutes_studied: u64,
    pub total_sessions: u64,
    pub total_pomodoros: u64,
    pub total_class_sessions: u64,
}

/// Partial overwrite of [`Statistics`]; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct StatisticsUpdate {
    pub total_minutes_studied: Option<u64>,
    pub total_sessions: Option<u64>,
    pub total_pomodoros: Option<u64>,
    pub total_class_sessions: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    MinutesStudied,
    Sessions,
    Pomodoros,
    ClassSessions,
}

impl Statistics {
    fn counter_mut(&mut self, stat: Stat) -> &mut u64 {
        match stat {
            Stat::MinutesStudied => &mut self.total_minutes_studied,
            Stat::Sessions => &mut self.total_sessions,
            Stat::Pomodoros => &mut self.total_pomodoros,
            Stat::ClassSessions => &mut self.total_class_sessions,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub xp: XpSystem,
    pub badges: Vec<Badge>,
    pub streaks: Streaks,
    pub statistics: Statistics,
}

impl UserProgress {
    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }
}

/// Result of [`ProgressService::add_xp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XpGain {
    pub leveled_up: bool,
    pub old_level: u64,
    pub new_level: u64,
    pub xp_gained: u64,
    pub total_xp: u64,
    pub reason: Option<String>,
}

impl XpGain {
    pub fn events(&self) -> Vec<Event> {
        let mut events = vec![Event::XpGained {
            amount: self.xp_gained,
            total: self.total_xp,
            reason: self.reason.clone(),
        }];
        if self.leveled_up {
            events.push(Event::LevelUp {
                old_level: self.old_level,
                new_level: self.new_level,
            });
        }
        events
    }
}

/// A badge earned by [`ProgressService::check_and_unlock`] and the reward
/// that came with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeUnlock {
    pub badge: Badge,
    pub xp: XpGain,
}

impl BadgeUnlock {
    pub fn events(&self) -> Vec<Event> {
        let mut events = vec![Event::BadgeUnlocked {
            id: self.badge.id.clone(),
            name: self.badge.name.clone(),
            at: self.badge.unlocked_at,
        }];
        events.extend(self.xp.events());
        events
    }
}

/// XP, badges, activity streak and lifetime counters of the single user.
pub struct ProgressService {
    progress: Persistent<UserProgress>,
    clock: Rc<dyn Clock>,
}

impl ProgressService {
    pub fn new(store: SharedStore, clock: Rc<dyn Clock>) -> Self {
        Self {
            progress: Persistent::hydrate(store, keys::USER_PROGRESS, UserProgress::default()),
            clock,
        }
    }

    pub fn progress(&self) -> &UserProgress {
        self.progress.get()
    }

    pub fn badges(&self) -> &[Badge] {
        &self.progress.get().badges
    }

    pub fn add_xp(&mut self, amount: u64, reason: Option<&str>) -> XpGain {
        let gain = self.progress.update(|p| {
            let old_level = p.xp.level;
            p.xp = XpSystem::from_total(p.xp.total_xp.saturating_add(amount));
            XpGain {
                leveled_up: p.xp.level > old_level,
                old_level,
                new_level: p.xp.level,
                xp_gained: amount,
                total_xp: p.xp.total_xp,
                reason: reason.map(str::to_string),
            }
        });
        tracing::debug!(amount, total = gain.total_xp, reason, "xp added");
        if gain.leveled_up {
            tracing::info!(from = gain.old_level, to = gain.new_level, "level up");
        }
        gain
    }

    /// Record `def` as earned. Each id is held at most once.
    pub fn add_badge(&mut self, def: &BadgeDefinition, at: DateTime<Utc>) -> Outcome<Badge> {
        if self.progress.get().has_badge(def.id) {
            return Outcome::NoOp(NoOpReason::AlreadyUnlocked {
                id: def.id.to_string(),
            });
        }
        let badge = def.unlock(at);
        self.progress.update(|p| p.badges.push(badge.clone()));
        tracing::info!(badge = def.id, "badge unlocked");
        Outcome::Applied(badge)
    }

    /// `true` extends the streak by one, `false` resets it.
    pub fn update_streak(&mut self, increment: bool) {
        let now = self.clock.now();
        self.progress.update(|p| {
            let s = &mut p.streaks;
            if increment {
                s.current += 1;
                s.longest = s.longest.max(s.current);
            } else {
                s.current = 0;
            }
            s.last_activity_date = Some(now);
        });
    }

    /// Day-based streak bookkeeping for one study activity.
    ///
    /// The first activity of a day extends the streak when the previous
    /// activity was yesterday and restarts it at 1 otherwise; each such day
    /// is worth [`XpReward::STREAK_DAY`]. Further activity on the same day
    /// changes nothing.
    pub fn record_activity(&mut self) -> Option<XpGain> {
        let now = self.clock.now();
        let today = now.date_naive();
        let last = self.progress.get().streaks.last_activity_date.map(|d| d.date_naive());
        if last == Some(today) {
            return None;
        }
        let continues = last.is_some_and(|d| today.pred_opt() == Some(d));
        self.progress.update(|p| {
            let s = &mut p.streaks;
            s.current = if continues { s.current + 1 } else { 1 };
            s.longest = s.longest.max(s.current);
            s.last_activity_date = Some(now);
        });
        Some(self.add_xp(XpReward::STREAK_DAY, Some("study day")))
    }

    pub fn update_statistics(&mut self, update: StatisticsUpdate) {
        self.progress.update(|p| {
            let st = &mut p.statistics;
            if let Some(v) = update.total_minutes_studied {
                st.total_minutes_studied = v;
            }
            if let Some(v) = update.total_sessions {
                st.total_sessions = v;
            }
            if let Some(v) = update.total_pomodoros {
                st.total_pomodoros = v;
            }
            if let Some(v) = update.total_class_sessions {
                st.total_class_sessions = v;
            }
        });
    }

    pub fn increment_stat(&mut self, stat: Stat, amount: u64) {
        self.progress.update(|p| {
            let counter = p.statistics.counter_mut(stat);
            *counter = counter.saturating_add(amount);
        });
    }

    /// Unlock every badge `ctx` newly qualifies for, awarding
    /// [`XpReward::BADGE_UNLOCKED`] per badge.
    ///
    /// `ctx.streak` is overwritten with the stored activity streak.
    pub fn check_and_unlock(&mut self, mut ctx: BadgeContext) -> Vec<BadgeUnlock> {
        let now = self.clock.now();
        ctx.streak = self.progress.get().streaks.current;
        let earned: Vec<&'static BadgeDefinition> = {
            let held = self.progress.get().badges.iter().map(|b| b.id.as_str());
            badges::evaluate(&ctx, held)
        };

        let mut unlocked = Vec::with_capacity(earned.len());
        for def in earned {
            if let Outcome::Applied(badge) = self.add_badge(def, now) {
                let reason = format!("Badge unlocked: {}", def.name);
                let xp = self.add_xp(XpReward::BADGE_UNLOCKED, Some(&reason));
                unlocked.push(BadgeUnlock { badge, xp });
            }
        }
        unlocked
    }
}
