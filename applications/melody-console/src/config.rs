/// Console configuration
use crate::error::{ConsoleError, Result};
use melody_playback::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File read when no `--config` is given, if present
pub const DEFAULT_CONFIG_PATH: &str = "melody.toml";

/// Environment variable prefix (`MELODY_SIMULATOR__TIME_SCALE=0.01`)
pub const ENV_PREFIX: &str = "MELODY";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MelodyConfig {
    #[serde(default = "default_bot")]
    pub bot: BotSettings,

    #[serde(default)]
    pub playback: SessionConfig,

    #[serde(default = "default_simulator")]
    pub simulator: SimulatorSettings,

    #[serde(default = "default_catalog")]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotSettings {
    /// Command prefix, `?play ...`
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Guild the console acts in
    #[serde(default = "default_guild_id")]
    pub guild_id: u64,

    /// Display name stamped on requested tracks
    #[serde(default = "default_requester")]
    pub requester: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorSettings {
    /// Wall-clock seconds per track second
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,

    /// Minimum normalized Levenshtein similarity for a fuzzy title match
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
}

impl MelodyConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise `melody.toml` is read if it
    /// exists and defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Like [`load`](Self::load) with a custom environment prefix
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Nested keys use a double underscore so field names keep theirs
        settings = settings.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ConsoleError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConsoleError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.bot.prefix.trim().is_empty() {
            return Err(ConsoleError::Config(
                "Command prefix must not be empty".to_string(),
            ));
        }

        if !(self.simulator.time_scale.is_finite() && self.simulator.time_scale > 0.0) {
            return Err(ConsoleError::Config(format!(
                "Simulator time scale must be positive, got {}",
                self.simulator.time_scale
            )));
        }

        if !(self.catalog.match_threshold > 0.0 && self.catalog.match_threshold <= 1.0) {
            return Err(ConsoleError::Config(format!(
                "Catalog match threshold must be in (0, 1], got {}",
                self.catalog.match_threshold
            )));
        }

        if self.playback.max_title_length < 4 {
            return Err(ConsoleError::Config(format!(
                "Max title length must be at least 4, got {}",
                self.playback.max_title_length
            )));
        }

        Ok(())
    }
}

// Default values
fn default_bot() -> BotSettings {
    BotSettings {
        prefix: default_prefix(),
        guild_id: default_guild_id(),
        requester: default_requester(),
    }
}

fn default_prefix() -> String {
    "?".to_string()
}

fn default_guild_id() -> u64 {
    1
}

fn default_requester() -> String {
    "console".to_string()
}

fn default_simulator() -> SimulatorSettings {
    SimulatorSettings {
        time_scale: default_time_scale(),
    }
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_catalog() -> CatalogSettings {
    CatalogSettings {
        path: default_catalog_path(),
        match_threshold: default_match_threshold(),
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog.toml")
}

fn default_match_threshold() -> f64 {
    0.6
}

impl Default for MelodyConfig {
    fn default() -> Self {
        Self {
            bot: default_bot(),
            playback: SessionConfig::default(),
            simulator: default_simulator(),
            catalog: default_catalog(),
        }
    }
}
