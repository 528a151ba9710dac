use chrono::{DateTime, Utc};
use clap::Subcommand;
use studyroom_core::dates;

use super::{open_app, parse_day, print_json, print_outcome, CliResult};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Plan a study session for a chapter
    Add {
        subject_id: String,
        chapter_id: String,
        /// Day of the session (defaults to today)
        #[arg(long, value_parser = parse_day)]
        date: Option<DateTime<Utc>>,
        /// Defaults to planning.default_session_min
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// List planned sessions
    List {
        /// Sessions on one day
        #[arg(long, value_parser = parse_day, conflicts_with = "week")]
        date: Option<DateTime<Utc>>,
        /// Seven days starting at this day
        #[arg(long, value_parser = parse_day)]
        week: Option<DateTime<Utc>>,
    },
    /// Mark a session completed and collect its XP
    Done { id: String },
    /// Mark a session skipped
    Skip { id: String },
    /// Spread chapters over a week, one session each
    Auto {
        #[arg(required = true)]
        chapter_ids: Vec<String>,
        /// First day of the week (defaults to this Monday)
        #[arg(long, value_parser = parse_day)]
        week_start: Option<DateTime<Utc>>,
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Delete a session
    Rm { id: String },
}

pub fn run(action: PlanAction) -> CliResult {
    let mut app = open_app()?;
    let default_minutes = app.config().planning.default_session_min;

    match action {
        PlanAction::Add {
            subject_id,
            chapter_id,
            date,
            minutes,
        } => {
            if app.subjects.chapter(&subject_id, &chapter_id).is_none() {
                let msg = format!("chapter '{chapter_id}' not found in subject '{subject_id}'");
                return Err(msg.into());
            }
            let day = date.unwrap_or_else(|| dates::start_of_day(Utc::now()));
            let session = app.planning.create_session(
                &subject_id,
                &chapter_id,
                day,
                minutes.unwrap_or(default_minutes),
            );
            print_json(&session)?;
        }
        PlanAction::List { date, week } => {
            let list = match (date, week) {
                (Some(day), _) => app.planning.by_date(day),
                (None, Some(start)) => app.planning.weekly(start),
                (None, None) => app.planning.sessions().iter().collect(),
            };
            print_json(&list)?;
        }
        PlanAction::Done { id } => {
            print_outcome(app.complete_planning_session(&id))?;
        }
        PlanAction::Skip { id } => {
            print_outcome(app.planning.mark_skipped(&id))?;
        }
        PlanAction::Auto {
            chapter_ids,
            week_start,
            minutes,
        } => {
            let mut chapters = Vec::with_capacity(chapter_ids.len());
            for id in &chapter_ids {
                match app.subjects.find_chapter(id) {
                    Some((_, chapter)) => chapters.push(chapter),
                    None => return Err(format!("chapter '{id}' not found").into()),
                }
            }
            let start = week_start.unwrap_or_else(|| dates::start_of_week(Utc::now()));
            let created =
                app.planning
                    .auto_distribute(&chapters, start, minutes.unwrap_or(default_minutes));
            print_json(&created)?;
        }
        PlanAction::Rm { id } => {
            print_outcome(app.planning.delete_session(&id))?;
        }
    }
    Ok(())
}
