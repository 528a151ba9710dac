use chrono::{DateTime, Utc};
use clap::Subcommand;
use studyroom_core::subjects::{Mastery, NewChapter, Priority};

use super::{open_app, parse_day, print_json, print_outcome, CliResult};

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Create a subject
    Add {
        name: String,
        /// Hex colour, #rgb or #rrggbb
        #[arg(long, default_value = "#3B82F6")]
        color: String,
        #[arg(long)]
        icon: Option<String>,
    },
    /// List subjects with their chapters
    List,
    /// Show one subject
    Show { id: String },
    /// Delete a subject and its chapters
    Rm { id: String },
    /// Add a chapter to a subject
    ChapterAdd {
        subject_id: String,
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Exam date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        exam: Option<DateTime<Utc>>,
    },
    /// Set chapter mastery (0-5)
    ChapterMastery {
        subject_id: String,
        chapter_id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=5))]
        level: u8,
    },
    /// Delete a chapter
    ChapterRm {
        subject_id: String,
        chapter_id: String,
    },
}

pub fn run(action: SubjectAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        SubjectAction::Add { name, color, icon } => {
            let subject = app.subjects.create_subject(&name, &color, icon.as_deref())?;
            print_json(&subject)?;
        }
        SubjectAction::List => {
            print_json(app.subjects.subjects())?;
        }
        SubjectAction::Show { id } => match app.subjects.subject(&id) {
            Some(subject) => print_json(subject)?,
            None => return Err(format!("subject '{id}' not found").into()),
        },
        SubjectAction::Rm { id } => {
            print_outcome(app.subjects.delete_subject(&id))?;
        }
        SubjectAction::ChapterAdd {
            subject_id,
            title,
            description,
            priority,
            exam,
        } => {
            let new = NewChapter {
                title,
                description,
                priority,
                exam_date: exam,
            };
            print_outcome(app.subjects.add_chapter(&subject_id, new)?)?;
        }
        SubjectAction::ChapterMastery {
            subject_id,
            chapter_id,
            level,
        } => {
            let mastery = Mastery::new(level)?;
            print_outcome(app.set_chapter_mastery(&subject_id, &chapter_id, mastery))?;
        }
        SubjectAction::ChapterRm {
            subject_id,
            chapter_id,
        } => {
            print_outcome(app.subjects.delete_chapter(&subject_id, &chapter_id))?;
        }
    }
    Ok(())
}
