//! TOML configuration for the TUI.
//!
//! Merge order: built-in defaults, then the config file, then
//! `GATTSCOPE_*` environment variables. CLI flags override on top of
//! whatever this module resolves.

use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
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

// ── Config struct ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Advertising name for the local adapter.
    #[serde(default = "default_adapter_name")]
    pub adapter_name: String,

    /// Log file path.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Interval for housekeeping ticks, in milliseconds.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    /// Interval for render ticks, in milliseconds.
    #[serde(default = "default_render_rate")]
    pub render_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adapter_name: default_adapter_name(),
            log_file: default_log_file(),
            tick_rate_ms: default_tick_rate(),
            render_rate_ms: default_render_rate(),
        }
    }
}

fn default_adapter_name() -> String {
    "Gattscope".into()
}
fn default_log_file() -> PathBuf {
    PathBuf::from("/tmp/gattscope.log")
}
fn default_tick_rate() -> u64 {
    250
}
fn default_render_rate() -> u64 {
    33
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "gattscope", "gattscope").map_or_else(
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
    p.push("gattscope");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the Config from file + environment.
pub fn load() -> Result<Config, ConfigError> {
    load_from(&config_path())
}

fn load_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GATTSCOPE_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning defaults if the file doesn't exist or is broken.
pub fn load_or_default() -> Config {
    load().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
#[allow(dead_code)]
pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.adapter_name, "Gattscope");
        assert_eq!(cfg.tick_rate_ms, 250);
        assert_eq!(cfg.render_rate_ms, 33);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "adapter_name = \"Bench Rig\"").unwrap();
        writeln!(file, "tick_rate_ms = 500").unwrap();

        let cfg = load_from(file.path()).unwrap();
        assert_eq!(cfg.adapter_name, "Bench Rig");
        assert_eq!(cfg.tick_rate_ms, 500);
        // Untouched fields keep their defaults
        assert_eq!(cfg.render_rate_ms, 33);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = Config {
            adapter_name: "Lab".into(),
            log_file: PathBuf::from("/var/log/gattscope.log"),
            tick_rate_ms: 100,
            render_rate_ms: 16,
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.adapter_name, cfg.adapter_name);
        assert_eq!(parsed.log_file, cfg.log_file);
    }
}
