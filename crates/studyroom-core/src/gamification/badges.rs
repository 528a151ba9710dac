//! Badge catalog and unlock rules.
//!
//! Each badge unlocks once a single counter of [`BadgeContext`] reaches a
//! threshold. Evaluation is pure: callers pass the ids they already hold and
//! receive only the newly earned definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Beginner,
    Consistency,
    Pomodoro,
    Class,
    Mastery,
}

/// Counter a badge condition looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Pomodoros,
    PlanningSessions,
    Classes,
    MasteredChapters,
    Streak,
    ClassBestAttention,
    ClassZeroDistraction,
    ClassStreak,
    ClassChallenges,
    ClassPerfect,
}

impl Counter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::Pomodoros => "pomodoro_count",
            Counter::PlanningSessions => "session_count",
            Counter::Classes => "class_count",
            Counter::MasteredChapters => "mastery_5_count",
            Counter::Streak => "streak",
            Counter::ClassBestAttention => "class_best_attention",
            Counter::ClassZeroDistraction => "class_zero_distraction",
            Counter::ClassStreak => "class_streak",
            Counter::ClassChallenges => "class_challenges",
            Counter::ClassPerfect => "class_perfect",
        }
    }
}

/// `counter >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub counter: Counter,
    pub threshold: u32,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} >= {}", self.counter.as_str(), self.threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: BadgeCategory,
    pub condition: Condition,
}

impl BadgeDefinition {
    /// Stamp the definition as earned at `at`.
    pub fn unlock(&self, at: DateTime<Utc>) -> Badge {
        Badge {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            category: self.category,
            condition: self.condition.to_string(),
            unlocked_at: at,
        }
    }
}

/// An earned badge as stored in the user's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: BadgeCategory,
    pub condition: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Snapshot of the counters badges are judged on. Gathered from several
/// services with no atomicity across them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeContext {
    pub pomodoro_count: u32,
    pub session_count: u32,
    pub class_count: u32,
    #[serde(rename = "mastery5Count")]
    pub mastery5_count: u32,
    pub streak: u32,
    pub class_best_attention: u32,
    pub class_zero_distraction_count: u32,
    pub class_streak: u32,
    pub class_challenges_completed: u32,
    pub class_perfect_count: u32,
}

impl BadgeContext {
    pub fn value(&self, counter: Counter) -> u32 {
        match counter {
            Counter::Pomodoros => self.pomodoro_count,
            Counter::PlanningSessions => self.session_count,
            Counter::Classes => self.class_count,
            Counter::MasteredChapters => self.mastery5_count,
            Counter::Streak => self.streak,
            Counter::ClassBestAttention => self.class_best_attention,
            Counter::ClassZeroDistraction => self.class_zero_distraction_count,
            Counter::ClassStreak => self.class_streak,
            Counter::ClassChallenges => self.class_challenges_completed,
            Counter::ClassPerfect => self.class_perfect_count,
        }
    }
}

const fn badge(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: BadgeCategory,
    counter: Counter,
    threshold: u32,
) -> BadgeDefinition {
    BadgeDefinition {
        id,
        name,
        description,
        icon,
        category,
        condition: Condition { counter, threshold },
    }
}

use BadgeCategory as Cat;

#[rustfmt::skip]
pub static CATALOG: [BadgeDefinition; 18] = [
    badge("first_pomodoro", "First Step", "Complete your first pomodoro", "🎯", Cat::Beginner, Counter::Pomodoros, 1),
    badge("first_session", "Organised", "Complete your first planning session", "📚", Cat::Beginner, Counter::PlanningSessions, 1),
    badge("first_class", "Attentive Student", "Follow your first class in class mode", "🏫", Cat::Beginner, Counter::Classes, 1),
    badge("first_mastery", "Progress", "Fully master a chapter", "⭐", Cat::Beginner, Counter::MasteredChapters, 1),
    badge("streak_3", "Regular", "3 days in a row with some activity", "🔥", Cat::Consistency, Counter::Streak, 3),
    badge("streak_7", "Determined", "7 days in a row with some activity", "🔥🔥", Cat::Consistency, Counter::Streak, 7),
    badge("streak_30", "Unstoppable", "30 days in a row with some activity", "🔥🔥🔥", Cat::Consistency, Counter::Streak, 30),
    badge("pomodoro_10", "Timer Rookie", "Complete 10 pomodoros", "⏱️", Cat::Pomodoro, Counter::Pomodoros, 10),
    badge("pomodoro_50", "Timer Regular", "Complete 50 pomodoros", "⏱️⏱️", Cat::Pomodoro, Counter::Pomodoros, 50),
    badge("pomodoro_100", "Timer Expert", "Complete 100 pomodoros", "⏱️⏱️⏱️", Cat::Pomodoro, Counter::Pomodoros, 100),
    badge("class_high_attention", "Focused", "Score 8 or more for attention", "🎓", Cat::Class, Counter::ClassBestAttention, 8),
    badge("class_zero_distraction", "Zero Distraction", "Finish a class without a single distraction", "🎓🎓", Cat::Class, Counter::ClassZeroDistraction, 1),
    badge("class_streak_5", "Class Streak", "Follow 5 classes in a row", "🎓🎓🎓", Cat::Class, Counter::ClassStreak, 5),
    badge("class_challenges_10", "Challenger", "Complete 10 micro-challenges", "🧠", Cat::Class, Counter::ClassChallenges, 10),
    badge("class_perfect", "Perfection", "A class with 10/10, challenge done and no distraction", "🏆", Cat::Class, Counter::ClassPerfect, 1),
    badge("mastery_5", "Competent", "Master 5 chapters", "📖", Cat::Mastery, Counter::MasteredChapters, 5),
    badge("mastery_20", "Expert", "Master 20 chapters", "📖📖", Cat::Mastery, Counter::MasteredChapters, 20),
    badge("mastery_50", "Master", "Master 50 chapters", "📖📖📖", Cat::Mastery, Counter::MasteredChapters, 50),
];

pub fn definition(id: &str) -> Option<&'static BadgeDefinition> {
    CATALOG.iter().find(|b| b.id == id)
}

pub fn is_unlocked_by(def: &BadgeDefinition, ctx: &BadgeContext) -> bool {
    ctx.value(def.condition.counter) >= def.condition.threshold
}

/// Definitions whose condition holds and whose id is not in `unlocked`, in
/// catalog order.
pub fn evaluate<'a, I>(ctx: &BadgeContext, unlocked: I) -> Vec<&'static BadgeDefinition>
where
    I: IntoIterator<Item = &'a str>,
{
    let held: HashSet<&str> = unlocked.into_iter().collect();
    CATALOG
        .iter()
        .filter(|def| !held.contains(def.id) && is_unlocked_by(def, ctx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    fn ids(defs: &[&BadgeDefinition]) -> Vec<&'static str> {
        defs.iter().map(|d| d.id).collect()
    }

    #[test]
    fn catalog_ids_are_unique() {
        let set: HashSet<_> = CATALOG.iter().map(|b| b.id).collect();
        assert_eq!(set.len(), CATALOG.len());
    }

    #[test]
    fn empty_context_unlocks_nothing() {
        assert!(evaluate(&BadgeContext::default(), NONE).is_empty());
    }

    #[test]
    fn thresholds_are_inclusive() {
        let ctx = BadgeContext {
            pomodoro_count: 10,
            ..Default::default()
        };
        assert_eq!(ids(&evaluate(&ctx, NONE)), ["first_pomodoro", "pomodoro_10"]);

        let ctx = BadgeContext {
            pomodoro_count: 9,
            ..Default::default()
        };
        assert_eq!(ids(&evaluate(&ctx, NONE)), ["first_pomodoro"]);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let ctx = BadgeContext {
            class_count: 1,
            class_best_attention: 9,
            class_zero_distraction_count: 1,
            class_perfect_count: 1,
            ..Default::default()
        };
        let first = evaluate(&ctx, NONE);
        assert_eq!(
            ids(&first),
            ["first_class", "class_high_attention", "class_zero_distraction", "class_perfect"]
        );
        let held: Vec<&str> = first.iter().map(|d| d.id).collect();
        assert!(evaluate(&ctx, held.iter().copied()).is_empty());
    }

    #[test]
    fn already_held_ids_are_skipped() {
        let ctx = BadgeContext {
            mastery5_count: 5,
            ..Default::default()
        };
        assert_eq!(ids(&evaluate(&ctx, ["first_mastery"])), ["mastery_5"]);
    }

    #[test]
    fn unlock_renders_condition() {
        let def = definition("streak_7").unwrap();
        let badge = def.unlock(Utc::now());
        assert_eq!(badge.condition, "streak >= 7");
        assert_eq!(badge.category, BadgeCategory::Consistency);
        let json = serde_json::to_value(&badge).unwrap();
        assert!(json.get("unlockedAt").is_some());
    }
}
