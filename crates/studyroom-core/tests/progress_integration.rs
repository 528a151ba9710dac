//! Rewards flowing from the services into XP, counters and badges.

use chrono::{Duration, TimeZone, Utc};
use std::rc::Rc;
use studyroom_core::gamification::badges;
use studyroom_core::pomodoro::PomodoroPreset;
use studyroom_core::subjects::NewChapter;
use studyroom_core::{Clock, Config, Database, Event, ManualClock, SharedStore, Studyroom};

fn app(store: &SharedStore, clock: &Rc<ManualClock>) -> Studyroom {
    let clock: Rc<dyn Clock> = clock.clone();
    Studyroom::open(store.clone(), clock, Config::default())
}

fn badge_ids(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::BadgeUnlocked { id, .. } => Some(id.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_perfect_class_unlocks_class_badges_once() {
    let store: SharedStore = Rc::new(Database::open_memory().unwrap());
    let clock = Rc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 2, 5, 10, 0, 0).unwrap(),
    ));
    let mut app = app(&store, &clock);

    app.class_mode.start("chem", "moles");
    app.class_mode.enter_during();
    clock.advance(Duration::minutes(45));
    app.class_mode.end_class();
    let done = app
        .complete_class(10, "all clear", "", true)
        .unwrap()
        .applied()
        .unwrap();

    assert_eq!(
        badge_ids(&done.events),
        [
            "first_class",
            "class_high_attention",
            "class_zero_distraction",
            "class_perfect"
        ]
    );
    assert!(done
        .events
        .iter()
        .any(|e| matches!(e, Event::LevelUp { old_level: 1, .. })));

    let progress = app.progress.progress();
    assert_eq!(progress.statistics.total_class_sessions, 1);
    assert_eq!(progress.statistics.total_minutes_studied, 45);
    // class 50+30+20+10+15, streak day 5, four badges
    assert_eq!(progress.xp.total_xp, 125 + 5 + 4 * 25);

    assert!(app.check_badges().is_empty());
}

#[test]
fn test_streak_badge_after_three_days() {
    let dir = tempfile::tempdir().unwrap();
    let store: SharedStore = Rc::new(Database::open_at(dir.path().join("s.db")).unwrap());
    let clock = Rc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 2, 5, 20, 0, 0).unwrap(),
    ));

    let mut unlocked = Vec::new();
    for _ in 0..3 {
        let mut app = app(&store, &clock);
        app.pomodoro.start(PomodoroPreset::TwentyFiveFive, None, None);
        clock.advance(Duration::minutes(25));
        let done = app.complete_pomodoro().applied().unwrap();
        assert!(!app.complete_pomodoro().is_applied());
        unlocked.extend(badge_ids(&done.events));
        clock.advance(Duration::days(1));
    }

    assert_eq!(unlocked, ["first_pomodoro", "streak_3"]);
    let app = app(&store, &clock);
    assert_eq!(app.progress.progress().streaks.current, 3);
    assert_eq!(app.progress.progress().statistics.total_pomodoros, 3);
    assert_eq!(app.pomodoro.stats().current_streak, 3);
    assert!(app.progress.progress().badges.iter().all(|b| badges::definition(&b.id).is_some()));
}

#[test]
fn test_planning_session_rewards() {
    let store: SharedStore = Rc::new(Database::open_memory().unwrap());
    let clock = Rc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 2, 5, 10, 0, 0).unwrap(),
    ));
    let mut app = app(&store, &clock);

    let subject = app.subjects.create_subject("Physics", "#0EA5E9", None).unwrap();
    let chapter = app
        .subjects
        .add_chapter(&subject.id, NewChapter::new("Optics"))
        .unwrap()
        .applied()
        .unwrap();
    let session = app
        .planning
        .create_session(&subject.id, &chapter.id, clock.now(), 30);

    let done = app.complete_planning_session(&session.id).applied().unwrap();
    assert_eq!(done.value.xp_earned, Some(15));
    assert_eq!(badge_ids(&done.events), ["first_session"]);
    assert_eq!(app.progress.progress().statistics.total_sessions, 1);
}
