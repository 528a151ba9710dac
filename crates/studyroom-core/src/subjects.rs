//! Subjects and their chapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::clock::{new_id, Clock};
use crate::error::ValidationError;
use crate::outcome::{NoOpReason, Outcome};
use crate::storage::{keys, Persistent, SharedStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("expected low, medium or high, got '{other}'"),
            }),
        }
    }
}

/// How well a chapter is known, 0 (not started) to 5 (mastered).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Mastery(u8);

impl Mastery {
    pub const MAX: Mastery = Mastery(5);

    pub fn new(level: u8) -> Result<Self, ValidationError> {
        if level > Self::MAX.0 {
            return Err(ValidationError::OutOfRange {
                field: "mastery".into(),
                value: i64::from(level),
                min: 0,
                max: i64::from(Self::MAX.0),
            });
        }
        Ok(Mastery(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_mastered(self) -> bool {
        self == Self::MAX
    }
}

impl TryFrom<u8> for Mastery {
    type Error = ValidationError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Mastery::new(level)
    }
}

impl From<Mastery> for u8 {
    fn from(m: Mastery) -> u8 {
        m.0
    }
}

impl fmt::Display for Mastery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    pub mastery: Mastery,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub chapters: Vec<Chapter>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subject {
    pub fn chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == chapter_id)
    }

    pub fn mastered_chapters(&self) -> usize {
        self.chapters.iter().filter(|c| c.mastery.is_mastered()).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubjectUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    /// `Some(None)` clears the icon.
    pub icon: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewChapter {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub exam_date: Option<DateTime<Utc>>,
}

impl NewChapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_exam_date(mut self, date: DateTime<Utc>) -> Self {
        self.exam_date = Some(date);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChapterUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub mastery: Option<Mastery>,
    pub exam_date: Option<Option<DateTime<Utc>>>,
}

/// `#rgb` or `#rrggbb`.
pub fn is_valid_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn check_color(color: &str) -> Result<(), ValidationError> {
    if is_valid_color(color) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: "color".into(),
            message: format!("'{color}' is not a #rgb or #rrggbb colour"),
        })
    }
}

fn check_not_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            message: "must not be empty".into(),
        })
    } else {
        Ok(())
    }
}

pub struct SubjectService {
    subjects: Persistent<Vec<Subject>>,
    clock: Rc<dyn Clock>,
}

impl SubjectService {
    pub fn new(store: SharedStore, clock: Rc<dyn Clock>) -> Self {
        Self {
            subjects: Persistent::hydrate(store, keys::SUBJECTS, Vec::new()),
            clock,
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        self.subjects.get()
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.get().iter().find(|s| s.id == id)
    }

    pub fn chapter(&self, subject_id: &str, chapter_id: &str) -> Option<&Chapter> {
        self.subject(subject_id)?.chapter(chapter_id)
    }

    /// Chapter by id alone, with the subject it belongs to.
    pub fn find_chapter(&self, chapter_id: &str) -> Option<(&Subject, &Chapter)> {
        self.subjects
            .get()
            .iter()
            .find_map(|s| s.chapter(chapter_id).map(|c| (s, c)))
    }

    pub fn create_subject(
        &mut self,
        name: &str,
        color: &str,
        icon: Option<&str>,
    ) -> Result<Subject, ValidationError> {
        check_not_blank("name", name)?;
        check_color(color)?;
        let now = self.clock.now();
        let subject = Subject {
            id: new_id(),
            name: name.trim().to_string(),
            color: color.to_string(),
            icon: icon.map(str::to_string),
            chapters: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.subjects.update(|all| all.push(subject.clone()));
        tracing::debug!(id = %subject.id, name = %subject.name, "subject created");
        Ok(subject)
    }

    pub fn update_subject(
        &mut self,
        id: &str,
        update: SubjectUpdate,
    ) -> Result<Outcome<Subject>, ValidationError> {
        if let Some(name) = &update.name {
            check_not_blank("name", name)?;
        }
        if let Some(color) = &update.color {
            check_color(color)?;
        }
        let now = self.clock.now();
        Ok(self.with_subject(id, |s| {
            if let Some(name) = update.name {
                s.name = name.trim().to_string();
            }
            if let Some(color) = update.color {
                s.color = color;
            }
            if let Some(icon) = update.icon {
                s.icon = icon;
            }
            s.updated_at = now;
            s.clone()
        }))
    }

    pub fn delete_subject(&mut self, id: &str) -> Outcome<Subject> {
        let Some(pos) = self.subjects.get().iter().position(|s| s.id == id) else {
            return Outcome::NoOp(NoOpReason::not_found("subject", id));
        };
        Outcome::Applied(self.subjects.update(|all| all.remove(pos)))
    }

    pub fn add_chapter(
        &mut self,
        subject_id: &str,
        new: NewChapter,
    ) -> Result<Outcome<Chapter>, ValidationError> {
        check_not_blank("title", &new.title)?;
        let now = self.clock.now();
        Ok(self.with_subject(subject_id, |s| {
            let chapter = Chapter {
                id: new_id(),
                subject_id: s.id.clone(),
                title: new.title.trim().to_string(),
                description: new.description,
                priority: new.priority,
                mastery: Mastery::default(),
                exam_date: new.exam_date,
                created_at: now,
                updated_at: now,
            };
            s.chapters.push(chapter.clone());
            s.updated_at = now;
            chapter
        }))
    }

    pub fn update_chapter(
        &mut self,
        subject_id: &str,
        chapter_id: &str,
        update: ChapterUpdate,
    ) -> Result<Outcome<Chapter>, ValidationError> {
        if let Some(title) = &update.title {
            check_not_blank("title", title)?;
        }
        Ok(self.with_chapter(subject_id, chapter_id, |c| {
            if let Some(title) = update.title {
                c.title = title.trim().to_string();
            }
            if let Some(description) = update.description {
                c.description = description;
            }
            if let Some(priority) = update.priority {
                c.priority = priority;
            }
            if let Some(mastery) = update.mastery {
                c.mastery = mastery;
            }
            if let Some(exam_date) = update.exam_date {
                c.exam_date = exam_date;
            }
            c.clone()
        }))
    }

    /// Set the mastery of a chapter, returning the previous level.
    pub fn set_mastery(
        &mut self,
        subject_id: &str,
        chapter_id: &str,
        mastery: Mastery,
    ) -> Outcome<Mastery> {
        self.with_chapter(subject_id, chapter_id, |c| {
            std::mem::replace(&mut c.mastery, mastery)
        })
    }

    pub fn delete_chapter(&mut self, subject_id: &str, chapter_id: &str) -> Outcome<Chapter> {
        let Some(pos) = self
            .subject(subject_id)
            .and_then(|s| s.chapters.iter().position(|c| c.id == chapter_id))
        else {
            return Outcome::NoOp(NoOpReason::not_found("chapter", chapter_id));
        };
        let now = self.clock.now();
        self.with_subject(subject_id, |s| {
            s.updated_at = now;
            s.chapters.remove(pos)
        })
    }

    /// Chapters at full mastery across all subjects.
    pub fn count_mastered_chapters(&self) -> u32 {
        self.subjects
            .get()
            .iter()
            .map(|s| s.mastered_chapters() as u32)
            .sum()
    }

    fn with_subject<R>(&mut self, id: &str, f: impl FnOnce(&mut Subject) -> R) -> Outcome<R> {
        if self.subject(id).is_none() {
            return Outcome::NoOp(NoOpReason::not_found("subject", id));
        }
        self.subjects.update(|all| match all.iter_mut().find(|s| s.id == id) {
            Some(s) => Outcome::Applied(f(s)),
            None => Outcome::NoOp(NoOpReason::not_found("subject", id)),
        })
    }

    /// Runs `f` on the chapter and bumps both timestamps.
    fn with_chapter<R>(
        &mut self,
        subject_id: &str,
        chapter_id: &str,
        f: impl FnOnce(&mut Chapter) -> R,
    ) -> Outcome<R> {
        if self.subject(subject_id).is_none() {
            return Outcome::NoOp(NoOpReason::not_found("subject", subject_id));
        }
        if self.chapter(subject_id, chapter_id).is_none() {
            return Outcome::NoOp(NoOpReason::not_found("chapter", chapter_id));
        }
        let now = self.clock.now();
        self.with_subject(subject_id, |s| {
            s.updated_at = now;
            let c = s
                .chapters
                .iter_mut()
                .find(|c| c.id == chapter_id)
                .map(|c| {
                    c.updated_at = now;
                    c
                });
            c.map(f)
        })
        .and_then(|r| match r {
            Some(r) => Outcome::Applied(r),
            None => Outcome::NoOp(NoOpReason::not_found("chapter", chapter_id)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn setup() -> (SubjectService, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        ));
        let store: SharedStore = Rc::new(MemoryStore::new());
        (SubjectService::new(store, clock.clone()), clock)
    }

    #[test]
    fn colours() {
        assert!(is_valid_color("#fff"));
        assert!(is_valid_color("#3B82F6"));
        assert!(!is_valid_color("3B82F6"));
        assert!(!is_valid_color("#3B82F"));
        assert!(!is_valid_color("#ggg"));
    }

    #[test]
    fn create_rejects_bad_colour() {
        let (mut svc, _) = setup();
        let err = svc.create_subject("Maths", "blue", None).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "color"));
        assert!(svc.subjects().is_empty());
    }

    #[test]
    fn mastery_is_bounded() {
        assert!(Mastery::new(5).is_ok());
        assert!(Mastery::new(6).is_err());
        assert!(serde_json::from_str::<Mastery>("7").is_err());
        assert_eq!(serde_json::from_str::<Mastery>("4").unwrap().get(), 4);
    }

    #[test]
    fn chapter_lifecycle_bumps_updated_at() {
        let (mut svc, clock) = setup();
        let maths = svc.create_subject("Maths", "#3B82F6", Some("∑")).unwrap();
        clock.advance(Duration::minutes(5));
        let ch = svc
            .add_chapter(&maths.id, NewChapter::new("Limits").with_priority(Priority::High))
            .unwrap()
            .applied()
            .unwrap();
        assert_eq!(ch.subject_id, maths.id);
        assert_eq!(ch.mastery.get(), 0);

        clock.advance(Duration::minutes(5));
        let previous = svc.set_mastery(&maths.id, &ch.id, Mastery::MAX);
        assert_eq!(previous, Outcome::Applied(Mastery::default()));
        let stored = svc.chapter(&maths.id, &ch.id).unwrap();
        assert!(stored.updated_at > ch.updated_at);
        assert!(svc.subject(&maths.id).unwrap().updated_at > maths.updated_at);
        assert_eq!(svc.count_mastered_chapters(), 1);

        assert!(svc.delete_chapter(&maths.id, &ch.id).is_applied());
        assert_eq!(svc.count_mastered_chapters(), 0);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let (mut svc, _) = setup();
        let s = svc.create_subject("Physics", "#f00", None).unwrap();
        assert_eq!(
            svc.delete_subject("nope").reason(),
            Some(&NoOpReason::not_found("subject", "nope"))
        );
        let out = svc.update_chapter(&s.id, "missing", ChapterUpdate::default()).unwrap();
        assert_eq!(out.reason(), Some(&NoOpReason::not_found("chapter", "missing")));
        let out = svc.add_chapter("nope", NewChapter::new("x")).unwrap();
        assert!(!out.is_applied());
    }

    #[test]
    fn update_subject_can_clear_icon() {
        let (mut svc, _) = setup();
        let s = svc.create_subject("History", "#abc", Some("📜")).unwrap();
        let updated = svc
            .update_subject(
                &s.id,
                SubjectUpdate {
                    icon: Some(None),
                    ..Default::default()
                },
            )
            .unwrap()
            .applied()
            .unwrap();
        assert_eq!(updated.icon, None);
        assert!(svc
            .update_subject(
                &s.id,
                SubjectUpdate {
                    color: Some("red".into()),
                    ..Default::default()
                }
            )
            .is_err());
    }

    #[test]
    fn find_chapter_by_id_alone() {
        let (mut svc, _) = setup();
        let s = svc.create_subject("Bio", "#0f0", None).unwrap();
        let c = svc
            .add_chapter(&s.id, NewChapter::new("Cells"))
            .unwrap()
            .applied()
            .unwrap();
        let (subject, chapter) = svc.find_chapter(&c.id).unwrap();
        assert_eq!(subject.id, s.id);
        assert_eq!(chapter.title, "Cells");
    }
}
