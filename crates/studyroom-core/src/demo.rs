//! Demo subjects for trying the app on an empty store.

use chrono::{DateTime, Duration, Utc};

use crate::dates;
use crate::error::ValidationError;
use crate::subjects::{Mastery, NewChapter, Priority, Subject, SubjectService};

struct DemoChapter {
    title: &'static str,
    description: &'static str,
    priority: Priority,
    mastery: u8,
    exam_in_days: Option<i64>,
}

struct DemoSubject {
    name: &'static str,
    color: &'static str,
    icon: &'static str,
    chapters: &'static [DemoChapter],
}

const fn chapter(
    title: &'static str,
    description: &'static str,
    priority: Priority,
    mastery: u8,
    exam_in_days: Option<i64>,
) -> DemoChapter {
    DemoChapter {
        title,
        description,
        priority,
        mastery,
        exam_in_days,
    }
}

#[rustfmt::skip]
static DEMO: [DemoSubject; 3] = [
    DemoSubject { name: "Mathematics", color: "#3B82F6", icon: "📐", chapters: &[
        chapter("Derivatives", "Differential calculus and applications", Priority::High, 3, Some(7)),
        chapter("Integrals", "Integral calculus", Priority::Medium, 2, None),
        chapter("Limits and continuity", "", Priority::Low, 5, None),
    ]},
    DemoSubject { name: "Physics", color: "#10B981", icon: "🔬", chapters: &[
        chapter("Newtonian mechanics", "Forces, motion and energy", Priority::High, 2, Some(14)),
        chapter("Electromagnetism", "Electric and magnetic fields", Priority::Medium, 1, None),
    ]},
    DemoSubject { name: "History", color: "#F59E0B", icon: "📚", chapters: &[
        chapter("The French Revolution", "1789-1799", Priority::Medium, 4, None),
        chapter("World War I", "1914-1918", Priority::High, 3, Some(10)),
    ]},
];

/// Add the demo subjects and chapters. Exam dates are counted in days from
/// `now`. Mastery is set directly, so no XP is paid for it.
pub fn seed(
    subjects: &mut SubjectService,
    now: DateTime<Utc>,
) -> Result<Vec<Subject>, ValidationError> {
    let today = dates::start_of_day(now);
    let mut created = Vec::with_capacity(DEMO.len());
    for demo in &DEMO {
        let subject = subjects.create_subject(demo.name, demo.color, Some(demo.icon))?;
        for c in demo.chapters {
            let new = NewChapter {
                title: c.title.to_string(),
                description: (!c.description.is_empty()).then(|| c.description.to_string()),
                priority: c.priority,
                exam_date: c.exam_in_days.map(|d| today + Duration::days(d)),
            };
            if let Some(added) = subjects.add_chapter(&subject.id, new)?.applied() {
                subjects.set_mastery(&subject.id, &added.id, Mastery::new(c.mastery)?);
            }
        }
        created.push(subject.id);
    }
    tracing::info!(subjects = created.len(), "demo data seeded");
    Ok(created
        .iter()
        .filter_map(|id| subjects.subject(id).cloned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{MemoryStore, SharedStore};
    use chrono::TimeZone;
    use std::rc::Rc;

    #[test]
    fn seeds_three_subjects_with_linked_chapters() {
        let now = Utc.with_ymd_and_hms(2024, 9, 2, 15, 30, 0).unwrap();
        let store: SharedStore = Rc::new(MemoryStore::new());
        let mut svc = SubjectService::new(store, Rc::new(ManualClock::new(now)));

        let seeded = seed(&mut svc, now).unwrap();
        assert_eq!(seeded.len(), 3);
        assert_eq!(seeded.iter().map(|s| s.chapters.len()).sum::<usize>(), 7);
        assert!(seeded
            .iter()
            .all(|s| s.chapters.iter().all(|c| c.subject_id == s.id)));
        assert_eq!(svc.count_mastered_chapters(), 1);

        let derivatives = &seeded[0].chapters[0];
        assert_eq!(derivatives.mastery.get(), 3);
        assert_eq!(
            derivatives.exam_date,
            Some(Utc.with_ymd_and_hms(2024, 9, 9, 0, 0, 0).unwrap())
        );
        assert!(seeded[0].chapters[2].description.is_none());
    }
}
