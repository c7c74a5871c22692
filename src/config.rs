//! Runtime configuration.
//!
//! Resolution order: built-in defaults, then an optional JSON file, then
//! environment overrides (`TRANSPALENTOR_STORAGE_ROOT`, `TRANSPALENTOR_LOG`).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

pub const ENV_STORAGE_ROOT: &str = "TRANSPALENTOR_STORAGE_ROOT";
pub const ENV_LOG_LEVEL: &str = "TRANSPALENTOR_LOG";

/// Upload size cap (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_BRUSH_DIAMETER: u32 = 100;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory that holds one sub-directory per session.
    pub storage_root: PathBuf,
    pub max_file_size: u64,
    pub max_brush_diameter: u32,
    /// Reject negative stroke coordinates at the boundary. The eraser itself
    /// clips them either way.
    pub reject_negative_strokes: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: std::env::temp_dir().join("transpalentor"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_brush_diameter: DEFAULT_MAX_BRUSH_DIAMETER,
            reject_negative_strokes: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, overlaid with `path` when given, then with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_json_str(&std::fs::read_to_string(p)?)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_json_str(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    /// Apply overrides through `lookup` so tests don't have to touch the real
    /// process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup(ENV_STORAGE_ROOT).filter(|s| !s.is_empty()) {
            self.storage_root = PathBuf::from(root);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|s| !s.is_empty()) {
            self.log_level = level;
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json_str(r#"{ "max_brush_diameter": 40 }"#).unwrap();
        assert_eq!(cfg.max_brush_diameter, 40);
        assert_eq!(cfg.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert!(cfg.reject_negative_strokes);
    }

    #[test]
    fn env_overrides_win() {
        let mut cfg = Config::default();
        cfg.apply_env(|k| match k {
            ENV_STORAGE_ROOT => Some("/srv/keys".into()),
            ENV_LOG_LEVEL => Some("debug".into()),
            _ => None,
        });
        assert_eq!(cfg.storage_root, PathBuf::from("/srv/keys"));
        assert_eq!(cfg.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let cfg = Config { log_level: "chatty".into(), ..Config::default() };
        assert_eq!(cfg.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Config::from_json_str("{ nope").is_err());
    }
}
