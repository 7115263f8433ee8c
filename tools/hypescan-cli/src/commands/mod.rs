pub mod analyze;
pub mod convert;
pub mod import;
pub mod profile;

use clap::Args;

use hypescan_activity_core::profile::ProfileStore;
use hypescan_activity_core::DetectionConfig;
use hypescan_chat_model::emote::EmoteWeightTable;
use hypescan_common::config::AppConfig;

/// Detection settings that can be given on the command line.
///
/// Every flag overrides the profile (or built-in default) it is applied to.
#[derive(Args, Debug, Clone, Default)]
pub struct DetectionArgs {
    /// Bucket width in seconds
    #[arg(long = "interval", value_name = "SECS")]
    pub interval_secs: Option<f64>,

    /// Minimum weighted score for a peak
    #[arg(long, value_name = "SCORE", allow_negative_numbers = true)]
    pub peak_threshold: Option<f64>,

    /// Maximum weighted score for a valley
    #[arg(long, value_name = "SCORE", allow_negative_numbers = true)]
    pub valley_threshold: Option<f64>,

    /// Same-kind highlights closer than this many seconds are merged
    #[arg(long = "min-separation", value_name = "SECS")]
    pub min_separation_secs: Option<f64>,

    /// Emote weight as NAME=WEIGHT (NAME alone means weight 1); repeatable
    #[arg(long = "emote", value_name = "NAME=WEIGHT")]
    pub emotes: Vec<String>,

    /// Replace the built-in hype emote list instead of extending it
    #[arg(long)]
    pub only_listed_emotes: bool,
}

impl DetectionArgs {
    /// Layer the flags on top of `base`.
    pub fn apply(&self, base: DetectionConfig) -> anyhow::Result<DetectionConfig> {
        let mut config = base;
        if let Some(interval) = self.interval_secs {
            config.interval_width_secs = interval;
        }
        if let Some(peak) = self.peak_threshold {
            config.peak_threshold = peak;
        }
        if let Some(valley) = self.valley_threshold {
            config.valley_threshold = valley;
        }
        if let Some(separation) = self.min_separation_secs {
            config.min_separation_secs = separation;
        }

        let listed = EmoteWeightTable::from_entries(&self.emotes)?;
        config.emote_weights = if self.only_listed_emotes {
            listed
        } else {
            config.emote_weights.merged_with(&listed)?
        };

        Ok(config)
    }
}

/// The configuration a run starts from: the named profile, else the
/// configured default profile, else the built-in defaults.
pub fn base_config(app: &AppConfig, profile: Option<&str>) -> anyhow::Result<DetectionConfig> {
    let Some(name) = profile.or(app.default_profile.as_deref()) else {
        return Ok(DetectionConfig::default());
    };

    let store = ProfileStore::new(&app.profiles_dir);
    let saved = store
        .load(name)
        .map_err(|e| anyhow::anyhow!("Failed to load profile `{name}`: {e}"))?;
    tracing::debug!(profile = name, saved_at = %saved.saved_at, "Using detection profile");
    Ok(saved.detection)
}
