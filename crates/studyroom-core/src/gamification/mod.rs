//! XP, levels and badges.

pub mod badges;
mod progress;
pub mod xp;

pub use badges::{Badge, BadgeCategory, BadgeContext, BadgeDefinition};
pub use progress::{
    BadgeUnlock, ProgressService, Stat, Statistics, StatisticsUpdate, Streaks, UserProgress,
    XpGain,
};
pub use xp::{XpReward, XpSystem};
