use clap::Subcommand;
use studyroom_core::pomodoro::PomodoroPreset;

use super::{open_app, print_json, print_outcome, CliResult};

#[derive(Subcommand)]
pub enum PomodoroAction {
    /// Start a pomodoro, replacing any current one
    Start {
        /// 25-5, 40-10, 50-10 or custom (defaults to pomodoro.default_preset)
        #[arg(long)]
        preset: Option<PomodoroPreset>,
        /// Focus minutes for the custom preset
        #[arg(long)]
        focus: Option<u32>,
        /// Break minutes for the custom preset
        #[arg(long = "break")]
        break_min: Option<u32>,
        /// Planning session this pomodoro belongs to
        #[arg(long)]
        session: Option<String>,
    },
    /// Pause the countdown
    Pause,
    /// Resume a paused pomodoro
    Resume,
    /// Advance the countdown and show the current pomodoro
    Status,
    /// Discard the current pomodoro
    Stop,
    /// Count the current pomodoro as done once its focus phase is over
    Complete,
    /// Completion counters and day streak
    Stats,
}

pub fn run(action: PomodoroAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        PomodoroAction::Start {
            preset,
            focus,
            break_min,
            session,
        } => {
            let cfg = &app.config().pomodoro;
            let preset = preset.unwrap_or(cfg.default_preset);
            let custom = (preset == PomodoroPreset::Custom).then(|| {
                (
                    focus.unwrap_or(cfg.custom_focus_min),
                    break_min.unwrap_or(cfg.custom_break_min),
                )
            });
            let event = app.pomodoro.start(preset, session, custom);
            print_json(&event)?;
        }
        PomodoroAction::Pause => {
            print_outcome(app.pomodoro.pause())?;
        }
        PomodoroAction::Resume => {
            print_outcome(app.pomodoro.resume())?;
        }
        PomodoroAction::Status => {
            let events = app.pomodoro.tick();
            print_json(&serde_json::json!({
                "session": app.pomodoro.current(),
                "events": events,
            }))?;
        }
        PomodoroAction::Stop => {
            print_outcome(app.pomodoro.stop())?;
        }
        PomodoroAction::Complete => {
            print_outcome(app.complete_pomodoro())?;
        }
        PomodoroAction::Stats => {
            print_json(app.pomodoro.stats())?;
        }
    }
    Ok(())
}
