//! Short, medium and long term goals with milestones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::str::FromStr;

use crate::clock::{new_id, Clock};
use crate::error::ValidationError;
use crate::outcome::{NoOpReason, Outcome};
use crate::storage::{keys, Persistent, SharedStore};
use crate::subjects::is_valid_color;

const MS_PER_DAY: i64 = 86_400_000;

/// Short: up to two weeks. Medium: two to eight weeks. Long: beyond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    Short,
    Medium,
    Long,
}

impl FromStr for TimeFrame {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(TimeFrame::Short),
            "medium" => Ok(TimeFrame::Medium),
            "long" => Ok(TimeFrame::Long),
            other => Err(ValidationError::InvalidValue {
                field: "time_frame".into(),
                message: format!("expected short, medium or long, got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub time_frame: TimeFrame,
    pub target_date: DateTime<Utc>,
    /// Percentage, 0..=100.
    pub progress: u8,
    pub status: GoalStatus,
    pub milestones: Vec<Milestone>,
    pub linked_task_ids: Vec<String>,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Goal {
    /// Rounded share of completed milestones, 0 without milestones.
    fn milestone_progress(&self) -> u8 {
        let total = self.milestones.len();
        if total == 0 {
            return 0;
        }
        let done = self.milestones.iter().filter(|m| m.completed).count();
        ((done as f64 / total as f64) * 100.0).round() as u8
    }
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub title: String,
    pub description: String,
    pub time_frame: TimeFrame,
    pub target_date: DateTime<Utc>,
    /// Falls back to the service's default colour.
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_frame: Option<TimeFrame>,
    pub target_date: Option<DateTime<Utc>>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
}

pub struct GoalService {
    goals: Persistent<Vec<Goal>>,
    clock: Rc<dyn Clock>,
    default_color: String,
}

impl GoalService {
    pub fn new(store: SharedStore, clock: Rc<dyn Clock>) -> Self {
        Self {
            goals: Persistent::hydrate(store, keys::GOALS, Vec::new()),
            clock,
            default_color: "#3B82F6".to_string(),
        }
    }

    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    pub fn goals(&self) -> &[Goal] {
        self.goals.get()
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.get().iter().find(|g| g.id == id)
    }

    /// Active goals of one time frame.
    pub fn by_time_frame(&self, frame: TimeFrame) -> Vec<&Goal> {
        self.active()
            .into_iter()
            .filter(|g| g.time_frame == frame)
            .collect()
    }

    pub fn active(&self) -> Vec<&Goal> {
        self.goals
            .get()
            .iter()
            .filter(|g| g.status == GoalStatus::Active)
            .collect()
    }

    pub fn create_goal(&mut self, new: NewGoal) -> Result<Goal, ValidationError> {
        if new.title.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".into(),
                message: "must not be empty".into(),
            });
        }
        let color = new.color.unwrap_or_else(|| self.default_color.clone());
        check_color(&color)?;
        let now = self.clock.now();
        let goal = Goal {
            id: new_id(),
            title: new.title.trim().to_string(),
            description: new.description,
            time_frame: new.time_frame,
            target_date: new.target_date,
            progress: 0,
            status: GoalStatus::Active,
            milestones: Vec::new(),
            linked_task_ids: Vec::new(),
            color,
            icon: new.icon,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        self.goals.update(|all| all.push(goal.clone()));
        tracing::debug!(id = %goal.id, frame = ?goal.time_frame, "goal created");
        Ok(goal)
    }

    pub fn update_goal(
        &mut self,
        id: &str,
        update: GoalUpdate,
    ) -> Result<Outcome<Goal>, ValidationError> {
        if let Some(color) = &update.color {
            check_color(color)?;
        }
        Ok(self.with_goal(id, |g| {
            if let Some(v) = update.title {
                g.title = v;
            }
            if let Some(v) = update.description {
                g.description = v;
            }
            if let Some(v) = update.time_frame {
                g.time_frame = v;
            }
            if let Some(v) = update.target_date {
                g.target_date = v;
            }
            if let Some(v) = update.color {
                g.color = v;
            }
            if let Some(v) = update.icon {
                g.icon = v;
            }
            g.clone()
        }))
    }

    pub fn delete_goal(&mut self, id: &str) -> Outcome<Goal> {
        let Some(pos) = self.goals.get().iter().position(|g| g.id == id) else {
            return Outcome::NoOp(NoOpReason::not_found("goal", id));
        };
        Outcome::Applied(self.goals.update(|all| all.remove(pos)))
    }

    pub fn complete_goal(&mut self, id: &str) -> Outcome<Goal> {
        let now = self.clock.now();
        self.with_goal(id, |g| {
            g.status = GoalStatus::Completed;
            g.progress = 100;
            g.completed_at = Some(now);
            g.clone()
        })
    }

    pub fn abandon_goal(&mut self, id: &str) -> Outcome<Goal> {
        self.with_goal(id, |g| {
            g.status = GoalStatus::Abandoned;
            g.clone()
        })
    }

    pub fn add_milestone(&mut self, goal_id: &str, title: &str) -> Outcome<Milestone> {
        let milestone = Milestone {
            id: new_id(),
            title: title.to_string(),
            completed: false,
            completed_at: None,
        };
        self.with_goal(goal_id, |g| {
            g.milestones.push(milestone.clone());
            g.progress = g.milestone_progress();
            milestone
        })
    }

    /// Flip a milestone and recompute progress, which is returned.
    pub fn toggle_milestone(&mut self, goal_id: &str, milestone_id: &str) -> Outcome<u8> {
        if self.goal(goal_id).is_some_and(|g| !g.milestones.iter().any(|m| m.id == milestone_id)) {
            return Outcome::NoOp(NoOpReason::not_found("milestone", milestone_id));
        }
        let now = self.clock.now();
        self.with_goal(goal_id, |g| {
            for m in g.milestones.iter_mut().filter(|m| m.id == milestone_id) {
                m.completed = !m.completed;
                m.completed_at = m.completed.then_some(now);
            }
            g.progress = g.milestone_progress();
            g.progress
        })
    }

    pub fn delete_milestone(&mut self, goal_id: &str, milestone_id: &str) -> Outcome<u8> {
        if self.goal(goal_id).is_some_and(|g| !g.milestones.iter().any(|m| m.id == milestone_id)) {
            return Outcome::NoOp(NoOpReason::not_found("milestone", milestone_id));
        }
        self.with_goal(goal_id, |g| {
            g.milestones.retain(|m| m.id != milestone_id);
            g.progress = g.milestone_progress();
            g.progress
        })
    }

    pub fn link_task(&mut self, goal_id: &str, task_id: &str) -> Outcome<()> {
        if self
            .goal(goal_id)
            .is_some_and(|g| g.linked_task_ids.iter().any(|t| t == task_id))
        {
            return Outcome::NoOp(NoOpReason::AlreadyLinked);
        }
        self.with_goal(goal_id, |g| g.linked_task_ids.push(task_id.to_string()))
    }

    pub fn unlink_task(&mut self, goal_id: &str, task_id: &str) -> Outcome<()> {
        self.with_goal(goal_id, |g| g.linked_task_ids.retain(|t| t != task_id))
    }

    /// Set progress directly, clamped to 0..=100.
    pub fn update_progress(&mut self, goal_id: &str, progress: i64) -> Outcome<u8> {
        let clamped = progress.clamp(0, 100) as u8;
        self.with_goal(goal_id, |g| {
            g.progress = clamped;
            clamped
        })
    }

    /// Whole days until the target date, rounded up. Negative once passed.
    pub fn days_remaining(&self, goal_id: &str) -> Option<i64> {
        let goal = self.goal(goal_id)?;
        let ms = (goal.target_date - self.clock.now()).num_milliseconds();
        Some((ms + MS_PER_DAY - 1).div_euclid(MS_PER_DAY))
    }

    /// Runs `f` on the goal and bumps `updatedAt`.
    fn with_goal<R>(&mut self, id: &str, f: impl FnOnce(&mut Goal) -> R) -> Outcome<R> {
        if self.goal(id).is_none() {
            return Outcome::NoOp(NoOpReason::not_found("goal", id));
        }
        let now = self.clock.now();
        self.goals.update(|all| match all.iter_mut().find(|g| g.id == id) {
            Some(g) => {
                g.updated_at = now;
                Outcome::Applied(f(g))
            }
            None => Outcome::NoOp(NoOpReason::not_found("goal", id)),
        })
    }
}

fn check_color(color: &str) -> Result<(), ValidationError> {
    if is_valid_color(color) {
        return Ok(());
    }
    Err(ValidationError::InvalidValue {
        field: "color".into(),
        message: format!("'{color}' is not a #rgb or #rrggbb colour"),
    })
}
