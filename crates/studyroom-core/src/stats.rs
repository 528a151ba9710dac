//! Study statistics derived from planning sessions and class history.
//!
//! Everything here is a pure read over borrowed slices; nothing is stored.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::class_mode::ClassSession;
use crate::dates;
use crate::planning::{PlanningSession, SessionStatus};
use crate::subjects::Subject;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: DateTime<Utc>,
    pub minutes_studied: u32,
    pub sessions_completed: u32,
    /// Completed sessions that were run with a pomodoro.
    pub pomodoros_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub days: Vec<DailyStats>,
    pub total_minutes: u32,
    pub total_sessions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub subject_id: String,
    pub subject_name: String,
    pub total_minutes: u32,
    pub sessions_completed: u32,
    pub color: String,
}

pub struct StudyStats<'a> {
    subjects: &'a [Subject],
    sessions: &'a [PlanningSession],
    history: &'a [&'a ClassSession],
}

impl<'a> StudyStats<'a> {
    pub fn new(
        subjects: &'a [Subject],
        sessions: &'a [PlanningSession],
        history: &'a [&'a ClassSession],
    ) -> Self {
        Self {
            subjects,
            sessions,
            history,
        }
    }

    fn completed(&self) -> impl Iterator<Item = &'a PlanningSession> {
        self.sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Completed)
    }

    pub fn daily(&self, day: DateTime<Utc>) -> DailyStats {
        let mut stats = DailyStats {
            date: dates::start_of_day(day),
            minutes_studied: 0,
            sessions_completed: 0,
            pomodoros_completed: 0,
        };
        for s in self.completed().filter(|s| dates::is_same_day(s.date, day)) {
            stats.minutes_studied += s.duration;
            stats.sessions_completed += 1;
            if s.pomodoro_id.is_some() {
                stats.pomodoros_completed += 1;
            }
        }
        stats
    }

    /// Seven daily entries starting at `week_start`.
    pub fn weekly(&self, week_start: DateTime<Utc>) -> WeeklyStats {
        let first = dates::start_of_day(week_start);
        let days: Vec<DailyStats> = (0..7)
            .map(|i| self.daily(first + Duration::days(i)))
            .collect();
        WeeklyStats {
            total_minutes: days.iter().map(|d| d.minutes_studied).sum(),
            total_sessions: days.iter().map(|d| d.sessions_completed).sum(),
            days,
        }
    }

    /// Minutes per subject, largest first. Subjects without completed
    /// minutes are left out.
    pub fn subject_distribution(&self) -> Vec<SubjectStats> {
        let mut out: Vec<SubjectStats> = self
            .subjects
            .iter()
            .filter_map(|subject| {
                let (minutes, count) = self
                    .completed()
                    .filter(|s| s.subject_id == subject.id)
                    .fold((0u32, 0u32), |(m, c), s| (m + s.duration, c + 1));
                (minutes > 0).then(|| SubjectStats {
                    subject_id: subject.id.clone(),
                    subject_name: subject.name.clone(),
                    total_minutes: minutes,
                    sessions_completed: count,
                    color: subject.color.clone(),
                })
            })
            .collect();
        out.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));
        out
    }

    /// Completed share of all planned sessions, rounded percent.
    pub fn completion_rate(&self) -> u32 {
        if self.sessions.is_empty() {
            return 0;
        }
        let done = self.completed().count() as f64;
        (done / self.sessions.len() as f64 * 100.0).round() as u32
    }

    /// Attention scores of the last `n` archived classes, oldest first.
    pub fn attention_trend(&self, n: usize) -> Vec<u8> {
        let skip = self.history.len().saturating_sub(n);
        self.history[skip..]
            .iter()
            .map(|s| s.evaluation.attention_score)
            .collect()
    }

    pub fn total_minutes_studied(&self) -> u32 {
        self.completed().map(|s| s.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_mode::{ClassEvaluation, ClassPhase, MicroChallenge};
    use chrono::TimeZone;

    fn session(subject: &str, day: u32, minutes: u32, status: SessionStatus) -> PlanningSession {
        PlanningSession {
            id: format!("{subject}-{day}-{minutes}"),
            subject_id: subject.into(),
            chapter_id: "c".into(),
            date: Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap(),
            duration: minutes,
            status,
            completed_at: None,
            pomodoro_id: None,
            xp_earned: None,
        }
    }

    fn subject(id: &str) -> Subject {
        let now = Utc::now();
        Subject {
            id: id.into(),
            name: id.to_uppercase(),
            color: "#000".into(),
            icon: None,
            chapters: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn class(score: u8) -> ClassSession {
        let challenge = MicroChallenge {
            id: "x".into(),
            description: "x".into(),
            completed: false,
            points: 10,
        };
        let mut s = ClassSession::new("s", "c", challenge, 3, Utc::now());
        s.phase = ClassPhase::Completed;
        s.evaluation = ClassEvaluation {
            attention_score: score,
            ..Default::default()
        };
        s
    }

    #[test]
    fn distribution_sorted_and_filtered() {
        let subjects = [subject("maths"), subject("art"), subject("bio")];
        let sessions = [
            session("maths", 6, 30, SessionStatus::Completed),
            session("bio", 6, 45, SessionStatus::Completed),
            session("bio", 7, 30, SessionStatus::Completed),
            session("art", 7, 60, SessionStatus::Planned),
        ];
        let stats = StudyStats::new(&subjects, &sessions, &[]);
        let dist = stats.subject_distribution();
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].subject_id, "bio");
        assert_eq!(dist[0].total_minutes, 75);
        assert_eq!(dist[0].sessions_completed, 2);
        assert_eq!(dist[1].subject_name, "MATHS");
        assert_eq!(stats.completion_rate(), 75);
        assert_eq!(stats.total_minutes_studied(), 105);
    }

    #[test]
    fn weekly_has_seven_days() {
        let mut pomodoro_run = session("maths", 8, 25, SessionStatus::Completed);
        pomodoro_run.pomodoro_id = Some("p1".into());
        let sessions = [
            session("maths", 6, 30, SessionStatus::Completed),
            pomodoro_run,
            session("maths", 13, 50, SessionStatus::Completed),
        ];
        let stats = StudyStats::new(&[], &sessions, &[]);
        let week = stats.weekly(Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap());
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.total_minutes, 55);
        assert_eq!(week.total_sessions, 2);
        assert_eq!(week.days[2].pomodoros_completed, 1);
    }

    #[test]
    fn empty_inputs() {
        let stats = StudyStats::new(&[], &[], &[]);
        assert_eq!(stats.completion_rate(), 0);
        assert!(stats.attention_trend(7).is_empty());
    }

    #[test]
    fn trend_keeps_the_most_recent() {
        let classes: Vec<ClassSession> = [4, 6, 8, 9].into_iter().map(class).collect();
        let history: Vec<&ClassSession> = classes.iter().collect();
        let stats = StudyStats::new(&[], &[], &history);
        assert_eq!(stats.attention_trend(3), [6, 8, 9]);
        assert_eq!(stats.attention_trend(10), [4, 6, 8, 9]);
    }
}
