use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;
use studyroom_core::goals::{Goal, NewGoal, TimeFrame};
use studyroom_core::tasks::TaskUpdate;

use super::{open_app, parse_day, print_json, print_outcome, CliResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a goal
    Add {
        title: String,
        /// short, medium or long
        #[arg(long)]
        frame: TimeFrame,
        /// Target date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        target: DateTime<Utc>,
        #[arg(long, default_value = "")]
        description: String,
        /// Defaults to goals.default_color
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// List active goals
    List {
        #[arg(long)]
        frame: Option<TimeFrame>,
        /// Include completed and abandoned goals
        #[arg(long)]
        all: bool,
    },
    /// Add a milestone
    MilestoneAdd { goal_id: String, title: String },
    /// Toggle a milestone and recompute progress
    MilestoneToggle { goal_id: String, milestone_id: String },
    /// Mark a goal completed
    Complete { id: String },
    /// Abandon a goal
    Abandon { id: String },
    /// Link a task to a goal
    Link { goal_id: String, task_id: String },
    /// Set progress (clamped to 0-100)
    Progress {
        goal_id: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalView<'a> {
    #[serde(flatten)]
    goal: &'a Goal,
    days_remaining: Option<i64>,
}

pub fn run(action: GoalAction) -> CliResult {
    let mut app = open_app()?;
    let goals = &mut app.goals;

    match action {
        GoalAction::Add {
            title,
            frame,
            target,
            description,
            color,
            icon,
        } => {
            let goal = goals.create_goal(NewGoal {
                title,
                description,
                time_frame: frame,
                target_date: target,
                color,
                icon,
            })?;
            print_json(&goal)?;
        }
        GoalAction::List { frame, all } => {
            let list: Vec<&Goal> = match (frame, all) {
                (Some(frame), false) => goals.by_time_frame(frame),
                (None, false) => goals.active(),
                (frame, true) => goals
                    .goals()
                    .iter()
                    .filter(|g| frame.map_or(true, |f| g.time_frame == f))
                    .collect(),
            };
            let views: Vec<GoalView> = list
                .into_iter()
                .map(|goal| GoalView {
                    goal,
                    days_remaining: goals.days_remaining(&goal.id),
                })
                .collect();
            print_json(&views)?;
        }
        GoalAction::MilestoneAdd { goal_id, title } => {
            print_outcome(goals.add_milestone(&goal_id, &title))?;
        }
        GoalAction::MilestoneToggle {
            goal_id,
            milestone_id,
        } => {
            let outcome = goals.toggle_milestone(&goal_id, &milestone_id);
            print_outcome(outcome.map(|progress| serde_json::json!({ "progress": progress })))?;
        }
        GoalAction::Complete { id } => {
            print_outcome(goals.complete_goal(&id))?;
        }
        GoalAction::Abandon { id } => {
            print_outcome(goals.abandon_goal(&id))?;
        }
        GoalAction::Link { goal_id, task_id } => {
            if app.tasks.task(&task_id).is_none() {
                return Err(format!("task '{task_id}' not found").into());
            }
            print_outcome(goals.link_task(&goal_id, &task_id))?;
            app.tasks.update_task(
                &task_id,
                TaskUpdate {
                    goal_id: Some(Some(goal_id)),
                    ..Default::default()
                },
            );
        }
        GoalAction::Progress { goal_id, value } => {
            let outcome = goals.update_progress(&goal_id, value);
            print_outcome(outcome.map(|progress| serde_json::json!({ "progress": progress })))?;
        }
    }
    Ok(())
}
