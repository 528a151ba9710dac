use clap::Subcommand;
use serde::Serialize;
use studyroom_core::gamification::badges::{self, BadgeCategory};

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// XP, level, streak and lifetime counters
    Show,
    /// Unlocked badges
    Badges {
        /// The whole catalog, with an unlocked flag
        #[arg(long)]
        all: bool,
    },
    /// Unlock any badge the current counters qualify for
    Check,
}

#[derive(Serialize)]
struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: BadgeCategory,
    condition: String,
    unlocked: bool,
}

pub fn run(action: ProgressAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        ProgressAction::Show => {
            print_json(app.progress.progress())?;
        }
        ProgressAction::Badges { all: false } => {
            print_json(app.progress.badges())?;
        }
        ProgressAction::Badges { all: true } => {
            let progress = app.progress.progress();
            let catalog: Vec<CatalogEntry> = badges::CATALOG
                .iter()
                .map(|def| CatalogEntry {
                    id: def.id,
                    name: def.name,
                    description: def.description,
                    icon: def.icon,
                    category: def.category,
                    condition: def.condition.to_string(),
                    unlocked: progress.has_badge(def.id),
                })
                .collect();
            print_json(&catalog)?;
        }
        ProgressAction::Check => {
            print_json(&app.check_badges())?;
        }
    }
    Ok(())
}
