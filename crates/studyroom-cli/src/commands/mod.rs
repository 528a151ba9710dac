pub mod class;
pub mod config;
pub mod goal;
pub mod plan;
pub mod pomodoro;
pub mod progress;
pub mod stats;
pub mod subject;
pub mod task;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use studyroom_core::{
    dates, Config, CoreError, Database, NoOpReason, Outcome, SharedStore, Studyroom, SystemClock,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// An operation that left state untouched, reported as a failed command.
#[derive(Debug)]
pub struct NoOp(pub NoOpReason);

impl fmt::Display for NoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nothing changed: {}", self.0)
    }
}

impl std::error::Error for NoOp {}

/// Open every service over the on-disk store.
pub fn open_app() -> Result<Studyroom, CoreError> {
    let config = Config::load_or_default();
    let store: SharedStore = Rc::new(Database::open()?);
    tracing::debug!(preset = %config.pomodoro.default_preset, "store opened");
    Ok(Studyroom::open(store, Rc::new(SystemClock), config))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the applied value, or fail with the no-op reason.
pub fn print_outcome<T: Serialize>(outcome: Outcome<T>) -> CliResult {
    match outcome {
        Outcome::Applied(value) => print_json(&value),
        Outcome::NoOp(reason) => Err(Box::new(NoOp(reason))),
    }
}

/// `today`, `tomorrow`, `yesterday` or `YYYY-MM-DD`, as midnight UTC.
pub fn parse_day(s: &str) -> Result<DateTime<Utc>, String> {
    let today = dates::start_of_day(Utc::now());
    match s {
        "today" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        "yesterday" => Ok(today - Duration::days(1)),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(dates::midnight)
            .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_day_accepts_iso_dates() {
        assert_eq!(
            parse_day("2024-03-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_day("01/03/2024").is_err());
        assert_eq!(
            parse_day("tomorrow").unwrap() - parse_day("today").unwrap(),
            Duration::days(1)
        );
    }
}
