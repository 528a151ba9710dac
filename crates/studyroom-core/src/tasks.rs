//! To-do items, optionally tied to a goal, subject or chapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::str::FromStr;

use crate::clock::{new_id, Clock};
use crate::dates;
use crate::error::ValidationError;
use crate::outcome::{NoOpReason, Outcome};
use crate::storage::{keys, Persistent, SharedStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
    Cancelled,
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("unknown task status '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl FromStr for TaskPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            other => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("unknown task priority '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<u32>,
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_open(&self) -> bool {
        self.status != TaskStatus::Completed
    }

    /// Minutes credited to the task: measured if known, else estimated.
    pub fn minutes_spent(&self) -> u32 {
        self.actual_minutes.or(self.estimated_minutes).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTaskOptions {
    pub description: Option<String>,
    pub goal_id: Option<String>,
    pub subject_id: Option<String>,
    pub chapter_id: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_minutes: Option<u32>,
    pub tags: Vec<String>,
}

/// Fields to overwrite. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub goal_id: Option<Option<String>>,
    pub subject_id: Option<Option<String>>,
    pub chapter_id: Option<Option<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub estimated_minutes: Option<Option<u32>>,
    pub actual_minutes: Option<Option<u32>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    /// Percentage, 0 when there are no tasks.
    pub completion_rate: f64,
    pub total_minutes_spent: u64,
    pub tasks_completed_this_week: usize,
    pub tasks_completed_this_month: usize,
}

pub struct TaskService {
    tasks: Persistent<Vec<Task>>,
    clock: Rc<dyn Clock>,
}

impl TaskService {
    pub fn new(store: SharedStore, clock: Rc<dyn Clock>) -> Self {
        Self {
            tasks: Persistent::hydrate(store, keys::TASKS, Vec::new()),
            clock,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.get()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get().iter().find(|t| t.id == id)
    }

    pub fn by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.filter(|t| t.status == status)
    }

    pub fn by_goal(&self, goal_id: &str) -> Vec<&Task> {
        self.filter(|t| t.goal_id.as_deref() == Some(goal_id))
    }

    pub fn by_subject(&self, subject_id: &str) -> Vec<&Task> {
        self.filter(|t| t.subject_id.as_deref() == Some(subject_id))
    }

    /// Open tasks due today.
    pub fn due_today(&self) -> Vec<&Task> {
        let now = self.clock.now();
        self.filter(|t| t.is_open() && t.due_date.is_some_and(|d| dates::is_same_day(d, now)))
    }

    /// Open tasks due between Monday and Sunday of the current week.
    pub fn due_this_week(&self) -> Vec<&Task> {
        let now = self.clock.now();
        let (start, end) = (dates::start_of_week(now), dates::end_of_week(now));
        self.filter(|t| t.is_open() && t.due_date.is_some_and(|d| d >= start && d < end))
    }

    pub fn overdue(&self) -> Vec<&Task> {
        let now = self.clock.now();
        self.filter(|t| t.is_open() && t.due_date.is_some_and(|d| d < now))
    }

    pub fn create_task(
        &mut self,
        title: &str,
        priority: TaskPriority,
        options: NewTaskOptions,
    ) -> Result<Task, ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".into(),
                message: "must not be empty".into(),
            });
        }
        let now = self.clock.now();
        let task = Task {
            id: new_id(),
            title: title.trim().to_string(),
            description: options.description,
            status: TaskStatus::Todo,
            priority,
            goal_id: options.goal_id,
            subject_id: options.subject_id,
            chapter_id: options.chapter_id,
            due_date: options.due_date,
            completed_at: None,
            estimated_minutes: options.estimated_minutes,
            actual_minutes: None,
            subtasks: Vec::new(),
            tags: options.tags,
            created_at: now,
            updated_at: now,
        };
        self.tasks.update(|all| all.push(task.clone()));
        tracing::debug!(id = %task.id, "task created");
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Outcome<Task> {
        self.with_task(id, |t| {
            if let Some(v) = update.title {
                t.title = v;
            }
            if let Some(v) = update.description {
                t.description = v;
            }
            if let Some(v) = update.priority {
                t.priority = v;
            }
            if let Some(v) = update.goal_id {
                t.goal_id = v;
            }
            if let Some(v) = update.subject_id {
                t.subject_id = v;
            }
            if let Some(v) = update.chapter_id {
                t.chapter_id = v;
            }
            if let Some(v) = update.due_date {
                t.due_date = v;
            }
            if let Some(v) = update.estimated_minutes {
                t.estimated_minutes = v;
            }
            if let Some(v) = update.actual_minutes {
                t.actual_minutes = v;
            }
            if let Some(v) = update.tags {
                t.tags = v;
            }
            t.clone()
        })
    }

    pub fn delete_task(&mut self, id: &str) -> Outcome<Task> {
        let Some(pos) = self.tasks.get().iter().position(|t| t.id == id) else {
            return Outcome::NoOp(NoOpReason::not_found("task", id));
        };
        Outcome::Applied(self.tasks.update(|all| all.remove(pos)))
    }

    /// Moving to `completed` stamps `completedAt`.
    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Outcome<Task> {
        let now = self.clock.now();
        self.with_task(id, |t| {
            t.status = status;
            if status == TaskStatus::Completed {
                t.completed_at = Some(now);
            }
            t.clone()
        })
    }

    /// Complete the task, keeping the previous measurement when none is given.
    pub fn complete_task(&mut self, id: &str, actual_minutes: Option<u32>) -> Outcome<Task> {
        let now = self.clock.now();
        self.with_task(id, |t| {
            t.status = TaskStatus::Completed;
            t.completed_at = Some(now);
            if actual_minutes.is_some() {
                t.actual_minutes = actual_minutes;
            }
            t.clone()
        })
    }

    pub fn add_subtask(&mut self, task_id: &str, title: &str) -> Outcome<SubTask> {
        let subtask = SubTask {
            id: new_id(),
            title: title.to_string(),
            completed: false,
        };
        self.with_task(task_id, |t| {
            t.subtasks.push(subtask.clone());
            subtask
        })
    }

    /// Flip a subtask, returning its new state.
    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Outcome<bool> {
        let exists = self
            .task(task_id)
            .is_some_and(|t| t.subtasks.iter().any(|s| s.id == subtask_id));
        if self.task(task_id).is_some() && !exists {
            return Outcome::NoOp(NoOpReason::not_found("subtask", subtask_id));
        }
        self.with_task(task_id, |t| {
            let mut state = false;
            for s in t.subtasks.iter_mut().filter(|s| s.id == subtask_id) {
                s.completed = !s.completed;
                state = s.completed;
            }
            state
        })
    }

    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) -> Outcome<SubTask> {
        let Some(pos) = self
            .task(task_id)
            .and_then(|t| t.subtasks.iter().position(|s| s.id == subtask_id))
        else {
            return Outcome::NoOp(NoOpReason::not_found("subtask", subtask_id));
        };
        self.with_task(task_id, |t| t.subtasks.remove(pos))
    }

    pub fn stats(&self) -> TasksStats {
        let now = self.clock.now();
        let week_start = dates::start_of_week(now);
        let month_start = dates::start_of_month(now);
        let all = self.tasks.get();
        let completed = self.by_status(TaskStatus::Completed);
        let completed_since = |from: DateTime<Utc>| {
            completed
                .iter()
                .filter(|t| t.completed_at.is_some_and(|at| at >= from))
                .count()
        };

        TasksStats {
            total_tasks: all.len(),
            completed_tasks: completed.len(),
            in_progress_tasks: self.by_status(TaskStatus::InProgress).len(),
            completion_rate: if all.is_empty() {
                0.0
            } else {
                completed.len() as f64 / all.len() as f64 * 100.0
            },
            total_minutes_spent: completed.iter().map(|t| u64::from(t.minutes_spent())).sum(),
            tasks_completed_this_week: completed_since(week_start),
            tasks_completed_this_month: completed_since(month_start),
        }
    }

    fn filter(&self, pred: impl Fn(&Task) -> bool) -> Vec<&Task> {
        self.tasks.get().iter().filter(|t| pred(t)).collect()
    }

    /// Runs `f` on the task and bumps `updatedAt`.
    fn with_task<R>(&mut self, id: &str, f: impl FnOnce(&mut Task) -> R) -> Outcome<R> {
        if self.task(id).is_none() {
            return Outcome::NoOp(NoOpReason::not_found("task", id));
        }
        let now = self.clock.now();
        self.tasks.update(|all| match all.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.updated_at = now;
                Outcome::Applied(f(t))
            }
            None => Outcome::NoOp(NoOpReason::not_found("task", id)),
        })
    }
}
