//! Calendar helpers. Days are UTC days; weeks start on Monday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    midnight(at.date_naive())
}

pub fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Monday 00:00 of the week containing `at`.
pub fn start_of_week(at: DateTime<Utc>) -> DateTime<Utc> {
    let day = at.date_naive();
    let back = i64::from(day.weekday().num_days_from_monday());
    midnight(day - Duration::days(back))
}

/// Monday 00:00 of the following week (exclusive bound).
pub fn end_of_week(at: DateTime<Utc>) -> DateTime<Utc> {
    start_of_week(at) + Duration::days(7)
}

pub fn start_of_month(at: DateTime<Utc>) -> DateTime<Utc> {
    let day = at.date_naive();
    midnight(day - Duration::days(i64::from(day.day0())))
}

pub fn is_same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}
