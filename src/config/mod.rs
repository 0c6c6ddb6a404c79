mod defaults;
mod io;
mod store;
mod types;
mod validation;

pub use defaults::*;
pub use io::*;
pub use store::*;
pub use types::*;
pub use validation::*;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Top-level remindctl configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Which persisted settings shape to use.
    #[serde(default)]
    pub profile: ClientProfile,
    /// Persona sent with chat turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    /// Optional per-request timeout. Unset means the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory holding persisted settings.
    #[serde(default = "resolve_state_dir")]
    pub state_dir: PathBuf,
}

impl Config {
    /// Load configuration from file, environment, and defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(find_config_file);

        let mut config = match config_path {
            Some(config_path) if config_path.exists() => {
                info!("Loading config from {}", config_path.display());
                load_config_file(&config_path)?
            }
            _ => {
                info!("No config file found, using defaults");
                Config::default()
            }
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Write default configuration to a file.
    pub fn write_default(path: &str) -> Result<()> {
        write_config_file(Path::new(path), &Config::default())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Apply environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(profile) = std::env::var("REMINDCTL_PROFILE") {
            if let Ok(profile) = profile.parse() {
                self.profile = profile;
            }
        }

        if let Ok(dir) = std::env::var("REMINDCTL_STATE_DIR") {
            self.state_dir = PathBuf::from(dir);
        }

        if let Ok(persona) = std::env::var("REMINDCTL_PERSONA") {
            self.persona = Some(persona).filter(|p| !p.is_empty());
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: ClientProfile::default(),
            persona: None,
            request_timeout_secs: None,
            logging: LoggingConfig::default(),
            state_dir: resolve_state_dir(),
        }
    }
}

/// Find the configuration file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("remindctl.json"),
        PathBuf::from("remindctl.json5"),
        PathBuf::from("remindctl.yaml"),
        PathBuf::from("remindctl.yml"),
        PathBuf::from("remindctl.toml"),
    ];

    for path in &candidates {
        if path.exists() {
            return Some(path.clone());
        }
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(STATE_DIR_NAME).join("config.json");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    None
}

/// Resolve the directory used for persisted settings.
fn resolve_state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REMINDCTL_STATE_DIR") {
        return PathBuf::from(dir);
    }

    dirs::home_dir()
        .map(|h| h.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(STATE_DIR_NAME))
}

/// Load configuration from a file path.
fn load_config_file(path: &Path) -> Result<Config> {
    let value = read_config_file(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("Invalid configuration in '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_partial_config_with_defaults() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("remindctl.yaml");
        std::fs::write(&file, "profile: mobile\nrequestTimeoutSecs: 5\n").unwrap();

        let config = load_config_file(&file).unwrap();
        assert_eq!(config.profile, ClientProfile::Mobile);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
        assert!(config.persona.is_none());
    }

    #[test]
    fn rejects_unknown_profile() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("remindctl.json");
        std::fs::write(&file, r#"{"profile": "desktop"}"#).unwrap();

        assert!(load_config_file(&file).is_err());
    }

    #[test]
    fn default_config_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("remindctl.json");
        Config::write_default(file.to_str().unwrap()).unwrap();

        let config = load_config_file(&file).unwrap();
        assert_eq!(config.profile, ClientProfile::Web);
        assert!(config.request_timeout().is_none());
    }
}
