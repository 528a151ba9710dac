use chrono::{DateTime, Utc};
use clap::Subcommand;
use studyroom_core::{dates, StudyStats};

use super::{open_app, parse_day, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Planned and completed minutes for one day
    Day {
        /// Defaults to today
        #[arg(long, value_parser = parse_day)]
        date: Option<DateTime<Utc>>,
    },
    /// Seven-day breakdown
    Week {
        /// First day (defaults to this Monday)
        #[arg(long, value_parser = parse_day)]
        start: Option<DateTime<Utc>>,
    },
    /// Completed minutes per subject
    Subjects,
    /// Attention scores of the most recent classes
    Trend {
        #[arg(long, default_value_t = 7)]
        n: usize,
    },
    /// Completion rate and total minutes studied
    Summary,
}

pub fn run(action: StatsAction) -> CliResult {
    let app = open_app()?;
    let history = app.class_mode.session_history();
    let stats = StudyStats::new(app.subjects.subjects(), app.planning.sessions(), &history);
    let now = Utc::now();

    match action {
        StatsAction::Day { date } => {
            print_json(&stats.daily(date.unwrap_or(now)))?;
        }
        StatsAction::Week { start } => {
            let start = start.unwrap_or_else(|| dates::start_of_week(now));
            print_json(&stats.weekly(start))?;
        }
        StatsAction::Subjects => {
            print_json(&stats.subject_distribution())?;
        }
        StatsAction::Trend { n } => {
            print_json(&stats.attention_trend(n))?;
        }
        StatsAction::Summary => {
            print_json(&serde_json::json!({
                "completionRate": stats.completion_rate(),
                "totalMinutesStudied": stats.total_minutes_studied(),
            }))?;
        }
    }
    Ok(())
}
