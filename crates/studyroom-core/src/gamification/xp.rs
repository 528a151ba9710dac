//! Experience points and levels.
//!
//! Going from level `L` to `L + 1` costs `100 × L` points, so the cumulative
//! threshold of level `L` is the triangular number `100 × L(L−1)/2`. Level 1
//! starts at zero.

use serde::{Deserialize, Serialize};

const STEP: u64 = 100;

/// Points needed to go from `level` to `level + 1`.
pub fn xp_for_level(level: u64) -> u64 {
    STEP.saturating_mul(level)
}

/// Cumulative points needed to reach `level` from zero.
pub fn total_xp_for_level(level: u64) -> u64 {
    let l = u128::from(level);
    let total = u128::from(STEP) * l * l.saturating_sub(1) / 2;
    u64::try_from(total).unwrap_or(u64::MAX)
}

/// Largest `L >= 1` with `total_xp_for_level(L) <= total`.
///
/// Closed form: `L(L−1) <= total/50`, solved with an integer square root and
/// nudged by at most a step in either direction.
pub fn level(total: u64) -> u64 {
    let k = u128::from(total / (STEP / 2));
    let fits = |l: u128| l * l.saturating_sub(1) <= k;

    let mut l = (1 + isqrt(1 + 4 * k)) / 2;
    while !fits(l) {
        l -= 1;
    }
    while fits(l + 1) {
        l += 1;
    }
    (l.max(1)) as u64
}

/// Points earned inside the current level.
pub fn current_level_xp(total: u64) -> u64 {
    total - total_xp_for_level(level(total))
}

/// Points still missing before the next level.
///
/// Measured against the step out of the current level, `xp_for_level(level)`:
/// 0 XP leaves 100 to go and 100 XP (level 2) leaves 200. Stepping against
/// `level + 1` instead would break both.
pub fn xp_to_next_level(total: u64) -> u64 {
    xp_for_level(level(total)) - current_level_xp(total)
}

fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = (n as f64).sqrt() as u128;
    while x * x > n {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    x
}

/// Derived view of a point total. Always rebuilt from `total_xp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpSystem {
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
    pub level: u64,
    #[serde(rename = "xpToNextLevel")]
    pub xp_to_next_level: u64,
    #[serde(rename = "currentLevelXP")]
    pub current_level_xp: u64,
}

impl XpSystem {
    pub fn from_total(total: u64) -> Self {
        Self {
            total_xp: total,
            level: level(total),
            xp_to_next_level: xp_to_next_level(total),
            current_level_xp: current_level_xp(total),
        }
    }
}

impl Default for XpSystem {
    fn default() -> Self {
        Self::from_total(0)
    }
}

/// Flat rewards per event.
pub struct XpReward;

impl XpReward {
    pub const POMODORO_COMPLETED: u64 = 10;
    pub const SESSION_COMPLETED: u64 = 15;
    pub const CLASS_BASE: u64 = 50;
    pub const CHAPTER_MASTERY_UP: u64 = 20;
    pub const STREAK_DAY: u64 = 5;
    pub const BADGE_UNLOCKED: u64 = 25;

    /// Attention score of 8 or more.
    pub const CLASS_HIGH_ATTENTION: u64 = 20;
    /// Fewer than 3 distractions.
    pub const CLASS_LOW_DISTRACTIONS: u64 = 10;
    pub const CLASS_CHALLENGE_COMPLETED: u64 = 15;
    /// Per completed objective.
    pub const CLASS_OBJECTIVE_COMPLETED: u64 = 10;
}

/// Reward for one completed class.
pub fn class_xp(
    attention_score: u8,
    distraction_count: u32,
    challenge_completed: bool,
    objectives_completed: u32,
) -> u64 {
    let mut xp = XpReward::CLASS_BASE;
    xp += 3 * u64::from(attention_score);
    if attention_score >= 8 {
        xp += XpReward::CLASS_HIGH_ATTENTION;
    }
    if distraction_count < 3 {
        xp += XpReward::CLASS_LOW_DISTRACTIONS;
    }
    if challenge_completed {
        xp += XpReward::CLASS_CHALLENGE_COMPLETED;
    }
    xp + u64::from(objectives_completed) * XpReward::CLASS_OBJECTIVE_COMPLETED
}
