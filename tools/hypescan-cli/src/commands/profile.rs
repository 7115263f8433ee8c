//! Manage named detection profiles.

use clap::Subcommand;

use hypescan_activity_core::profile::ProfileStore;
use hypescan_common::config::{config_file_path, AppConfig};

use super::{base_config, DetectionArgs};

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Save detection settings under a name
    Save {
        /// Profile name (letters, digits, `-`, `_`)
        name: String,

        /// Start from another saved profile instead of the defaults
        #[arg(long)]
        from: Option<String>,

        #[command(flatten)]
        detection: DetectionArgs,
    },

    /// Print a saved profile as JSON
    Show {
        /// Profile name
        name: String,
    },

    /// List saved profiles
    List,

    /// Make a profile the default for `analyze`
    Use {
        /// Profile name
        name: String,
    },
}

pub fn run(mut app: AppConfig, action: ProfileAction) -> anyhow::Result<()> {
    let store = ProfileStore::new(&app.profiles_dir);

    match action {
        ProfileAction::Save {
            name,
            from,
            detection,
        } => {
            let base = base_config(&app, from.as_deref())?;
            let config = detection.apply(base)?;
            let saved = store.save(&name, &config)?;
            println!("Saved profile `{}` ({})", saved.name, saved.saved_at);
            println!("  Path: {}", store.path_for(&name)?.display());
        }
        ProfileAction::Show { name } => {
            let saved = store.load(&name)?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        ProfileAction::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No saved profiles in {}", store.dir().display());
            }
            for name in names {
                let marker = if app.default_profile.as_deref() == Some(name.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {name}");
            }
        }
        ProfileAction::Use { name } => {
            // Only existing profiles can become the default.
            store.load(&name)?;
            app.default_profile = Some(name.clone());
            app.save()?;
            println!(
                "Default profile set to `{name}` in {}",
                config_file_path().display()
            );
        }
    }

    Ok(())
}
