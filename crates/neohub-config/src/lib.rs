//! Shared configuration for neohub tools.
//!
//! TOML profiles with `NEOHUB_`-prefixed environment overrides, XDG /
//! platform path resolution, and translation to `neohub_core::HubConfig`.
//! The core never reads config files -- hosts load a profile here and hand
//! the result in.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use neohub_core::HubConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid profile '{profile}': {reason}")]
    Validation { profile: String, reason: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Named hub profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            profiles: HashMap::new(),
        }
    }
}

/// A named hub profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Hub host name or IP address.
    pub host: String,

    /// Hub TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Slow-cadence polling interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Exchange timeout in seconds.
    pub timeout: Option<u64>,
}

fn default_port() -> u16 {
    4242
}
fn default_poll_interval() -> u64 {
    60
}
fn default_timeout() -> u64 {
    5
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "neohub", "neohub").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("neohub");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from an explicit file + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NEOHUB_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// The profile to use: an explicit choice, the configured default, or
/// literally "default".
pub fn active_profile_name(explicit: Option<&str>, cfg: &Config) -> String {
    explicit
        .map(str::to_owned)
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Look up a profile and translate it into a validated [`HubConfig`].
pub fn resolve_profile(cfg: &Config, profile_name: &str) -> Result<HubConfig, ConfigError> {
    let profile = cfg
        .profiles
        .get(profile_name)
        .ok_or_else(|| ConfigError::UnknownProfile {
            profile: profile_name.into(),
        })?;
    profile_to_hub_config(profile, profile_name)
}

/// Build a [`HubConfig`] from a profile.
///
/// Runs the core's validation so an unusable profile fails here, with the
/// profile name attached, instead of at supervisor start.
pub fn profile_to_hub_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<HubConfig, ConfigError> {
    let hub = HubConfig {
        host: profile.host.clone(),
        port: profile.port,
        poll_interval_secs: profile.poll_interval,
        timeout: Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout)),
    };

    if let Err(err) = hub.validate() {
        let reason = match err {
            neohub_core::CoreError::Config { message } => message,
            other => other.to_string(),
        };
        return Err(ConfigError::Validation {
            profile: profile_name.into(),
            reason,
        });
    }

    Ok(hub)
}
