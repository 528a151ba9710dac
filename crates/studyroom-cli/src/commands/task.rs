use chrono::{DateTime, Utc};
use clap::{Subcommand, ValueEnum};
use studyroom_core::tasks::{NewTaskOptions, TaskPriority, TaskStatus};

use super::{open_app, parse_day, print_json, print_outcome, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum DueFilter {
    Today,
    Week,
    Overdue,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task
    Add {
        title: String,
        /// low, medium, high or urgent
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        chapter: Option<String>,
        /// Due date (YYYY-MM-DD, today, tomorrow)
        #[arg(long, value_parser = parse_day)]
        due: Option<DateTime<Utc>>,
        /// Estimated minutes
        #[arg(long)]
        estimate: Option<u32>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List tasks
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, value_enum)]
        due: Option<DueFilter>,
    },
    /// Mark a task completed
    Done {
        id: String,
        /// Minutes actually spent
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Change the status of a task
    Status { id: String, status: TaskStatus },
    /// Delete a task
    Rm { id: String },
    /// Add a subtask
    SubtaskAdd { task_id: String, title: String },
    /// Toggle a subtask
    SubtaskToggle { task_id: String, subtask_id: String },
    /// Task statistics
    Stats,
}

pub fn run(action: TaskAction) -> CliResult {
    let mut app = open_app()?;
    let tasks = &mut app.tasks;

    match action {
        TaskAction::Add {
            title,
            priority,
            description,
            goal,
            subject,
            chapter,
            due,
            estimate,
            tags,
        } => {
            let options = NewTaskOptions {
                description,
                goal_id: goal,
                subject_id: subject,
                chapter_id: chapter,
                due_date: due,
                estimated_minutes: estimate,
                tags,
            };
            let task = tasks.create_task(&title, priority, options)?;
            print_json(&task)?;
        }
        TaskAction::List {
            status,
            goal,
            subject,
            due,
        } => {
            let mut list = match due {
                Some(DueFilter::Today) => tasks.due_today(),
                Some(DueFilter::Week) => tasks.due_this_week(),
                Some(DueFilter::Overdue) => tasks.overdue(),
                None => tasks.tasks().iter().collect(),
            };
            if let Some(status) = status {
                list.retain(|t| t.status == status);
            }
            if let Some(goal) = goal {
                list.retain(|t| t.goal_id.as_deref() == Some(goal.as_str()));
            }
            if let Some(subject) = subject {
                list.retain(|t| t.subject_id.as_deref() == Some(subject.as_str()));
            }
            print_json(&list)?;
        }
        TaskAction::Done { id, minutes } => {
            print_outcome(tasks.complete_task(&id, minutes))?;
        }
        TaskAction::Status { id, status } => {
            print_outcome(tasks.set_status(&id, status))?;
        }
        TaskAction::Rm { id } => {
            print_outcome(tasks.delete_task(&id))?;
        }
        TaskAction::SubtaskAdd { task_id, title } => {
            print_outcome(tasks.add_subtask(&task_id, &title))?;
        }
        TaskAction::SubtaskToggle {
            task_id,
            subtask_id,
        } => {
            let outcome = tasks.toggle_subtask(&task_id, &subtask_id);
            print_outcome(outcome.map(|completed| serde_json::json!({ "completed": completed })))?;
        }
        TaskAction::Stats => {
            print_json(&tasks.stats())?;
        }
    }
    Ok(())
}
