use chrono::Utc;
use clap::Subcommand;
use studyroom_core::{demo, Config};

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "pomodoro.default_preset")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset {
        /// Also delete every stored subject, task, goal, session and reward
        #[arg(long)]
        data: bool,
    },
    /// Replace all stored data with demo subjects and chapters
    Demo,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List => {
            print_json(&Config::load()?)?;
        }
        ConfigAction::Reset { data } => {
            if data {
                let removed = open_app()?.reset_data()?;
                eprintln!("removed {removed} stored documents");
            }
            Config::default().save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Demo => {
            let removed = open_app()?.reset_data()?;
            eprintln!("removed {removed} stored documents");
            let mut app = open_app()?;
            print_json(&demo::seed(&mut app.subjects, Utc::now())?)?;
        }
    }
    Ok(())
}
