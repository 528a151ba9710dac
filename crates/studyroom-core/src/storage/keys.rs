//! Storage keys, one per persisted document.

/// Prefix shared by every application key.
pub const APP_PREFIX: &str = "app_";

pub const SUBJECTS: &str = "app_subjects";
pub const PLANNING_SESSIONS: &str = "app_planning_sessions";
pub const POMODORO_STATS: &str = "app_pomodoro_stats";
pub const CURRENT_POMODORO: &str = "app_current_pomodoro";
pub const USER_PROGRESS: &str = "app_user_progress";
pub const CLASS_SESSIONS: &str = "app_class_sessions";
pub const CLASS_STATS: &str = "app_class_stats";
pub const ACTIVE_CLASS_SESSION: &str = "app_active_class_session";
pub const TASKS: &str = "app_tasks";
pub const GOALS: &str = "app_goals";

/// Every persisted document, so a prefix clear can be checked against it.
pub const ALL: [&str; 10] = [
    SUBJECTS,
    PLANNING_SESSIONS,
    POMODORO_STATS,
    CURRENT_POMODORO,
    USER_PROGRESS,
    CLASS_SESSIONS,
    CLASS_STATS,
    ACTIVE_CLASS_SESSION,
    TASKS,
    GOALS,
];
