//! Named detection profiles stored as JSON files.
//!
//! Each profile lives at `<dir>/<name>.json`. Names are restricted to
//! ASCII letters, digits, `-` and `_` so they map to a single file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use hypescan_common::error::{HypescanError, HypescanResult};

use crate::config::DetectionConfig;

/// On-disk profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProfile {
    pub name: String,
    /// RFC 3339 timestamp of the last save.
    pub saved_at: String,
    pub detection: DetectionConfig,
}

/// Directory of saved profiles.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a profile with this name is stored at.
    pub fn path_for(&self, name: &str) -> HypescanResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.json")))
    }

    /// Write `detection` under `name`, replacing any existing profile.
    ///
    /// The configuration is validated first; an unusable one is never saved.
    pub fn save(&self, name: &str, detection: &DetectionConfig) -> HypescanResult<SavedProfile> {
        let path = self.path_for(name)?;
        detection.validate()?;

        std::fs::create_dir_all(&self.dir)?;
        let profile = SavedProfile {
            name: name.to_string(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            detection: detection.clone(),
        };
        let json = serde_json::to_string_pretty(&profile)?;
        std::fs::write(&path, json)?;

        tracing::debug!(profile = name, path = ?path, "Saved detection profile");
        Ok(profile)
    }

    /// Read the profile called `name`.
    pub fn load(&self, name: &str) -> HypescanResult<SavedProfile> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(HypescanError::FileNotFound { path });
        }
        let content = std::fs::read_to_string(&path)?;
        let profile: SavedProfile = serde_json::from_str(&content)?;
        Ok(profile)
    }

    /// Names of every stored profile, sorted. A missing directory is empty.
    pub fn list(&self) -> HypescanResult<Vec<String>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }

        let mut names = vec![];
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if validate_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn validate_name(name: &str) -> HypescanResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(HypescanError::config(format!(
            "invalid profile name `{name}`: use letters, digits, `-` or `_`"
        )))
    }
}
