use clap::Subcommand;
use studyroom_core::class_mode::{ClassObjective, ObjectiveType};

use super::{open_app, print_json, print_outcome, CliResult};

#[derive(Subcommand)]
pub enum ClassAction {
    /// Open a class session in the `before` phase
    Start { subject_id: String, chapter_id: String },
    /// Add an objective to the active class
    ObjectiveAdd {
        /// concentration, participation, notes or custom
        kind: ObjectiveType,
        description: String,
    },
    /// Show the micro-challenge, optionally drawing another one
    Challenge {
        #[arg(long)]
        reroll: bool,
    },
    /// Enter the `during` phase and start the clock
    Enter,
    /// Record the current attention level (clamped to 0-5)
    Attention {
        #[arg(allow_negative_numbers = true)]
        level: i32,
    },
    /// Count one distraction
    Distraction,
    /// Jot down a quick note
    Note { text: String },
    /// Flip an objective
    Toggle { objective_id: String },
    /// Leave the `during` phase
    End,
    /// Evaluate the class and collect its XP
    Complete {
        /// Self-assessed attention, 0-10
        score: u8,
        #[arg(long, default_value = "")]
        summary: String,
        #[arg(long, default_value = "")]
        review: String,
        #[arg(long)]
        challenge_done: bool,
    },
    /// Throw away the class in progress
    Cancel,
    /// Show the active class and its elapsed minutes
    Status,
    /// Completed classes
    History,
    /// Class mode statistics
    Stats {
        /// Rebuild from history instead of the running totals
        #[arg(long)]
        recompute: bool,
    },
}

pub fn run(action: ClassAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        ClassAction::Start {
            subject_id,
            chapter_id,
        } => {
            if app.subjects.chapter(&subject_id, &chapter_id).is_none() {
                let msg = format!("chapter '{chapter_id}' not found in subject '{subject_id}'");
                return Err(msg.into());
            }
            print_json(&app.class_mode.start(&subject_id, &chapter_id))?;
        }
        ClassAction::ObjectiveAdd { kind, description } => {
            let objective = ClassObjective::new(kind, description);
            let outcome = app.class_mode.add_objective(objective.clone());
            print_outcome(outcome.map(|()| objective))?;
        }
        ClassAction::Challenge { reroll } => {
            if reroll {
                print_outcome(app.class_mode.reroll_challenge())?;
            } else {
                match app.class_mode.active() {
                    Some(session) => print_json(&session.challenge)?,
                    None => return Err("no active class session".into()),
                }
            }
        }
        ClassAction::Enter => {
            print_outcome(app.class_mode.enter_during())?;
        }
        ClassAction::Attention { level } => {
            let outcome = app.class_mode.update_attention(level);
            print_outcome(outcome.map(|level| serde_json::json!({ "attentionLevel": level })))?;
        }
        ClassAction::Distraction => {
            let outcome = app.class_mode.add_distraction();
            print_outcome(outcome.map(|count| serde_json::json!({ "distractionCount": count })))?;
        }
        ClassAction::Note { text } => {
            let outcome = app.class_mode.add_quick_note(text);
            print_outcome(outcome.map(|count| serde_json::json!({ "notes": count })))?;
        }
        ClassAction::Toggle { objective_id } => {
            let outcome = app.class_mode.toggle_objective(&objective_id);
            print_outcome(outcome.map(|completed| serde_json::json!({ "completed": completed })))?;
        }
        ClassAction::End => {
            let outcome = app.class_mode.end_class();
            print_outcome(outcome.map(|minutes| serde_json::json!({ "duration": minutes })))?;
        }
        ClassAction::Complete {
            score,
            summary,
            review,
            challenge_done,
        } => {
            print_outcome(app.complete_class(score, &summary, &review, challenge_done)?)?;
        }
        ClassAction::Cancel => {
            print_outcome(app.class_mode.cancel_session())?;
        }
        ClassAction::Status => {
            let elapsed = app.class_mode.elapsed_minutes().applied();
            print_json(&serde_json::json!({
                "session": app.class_mode.active(),
                "elapsedMinutes": elapsed,
            }))?;
        }
        ClassAction::History => {
            print_json(&app.class_mode.session_history())?;
        }
        ClassAction::Stats { recompute } => {
            if recompute {
                print_json(&app.class_mode.recompute_stats())?;
            } else {
                print_json(app.class_mode.stats())?;
            }
        }
    }
    Ok(())
}
