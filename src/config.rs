//! Configuration file handling.
//!
//! A config file is JSON holding default settings for the tagger, the
//! extractor and the model store. Every field is optional. Command line
//! flags override individual values after loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::algo::extractor::ExtractorSettings;
use crate::algo::tagger::TaggerSettings;
use crate::error::{Error, Result};

pub const CONFIG_ENV: &str = "KEYPHRASE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tagger: TaggerSettings,

    #[serde(default)]
    pub extractor: ExtractorSettings,

    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Model store database (used with the `store` feature)
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Train share for `evaluate` when splitting a single dataset
    #[serde(default = "default_train_ratio")]
    pub train_ratio: f64,

    /// Seed for dataset splits
    #[serde(default = "default_seed")]
    pub seed: u64,
}

// ── Default helpers ──────────────────────────────────────────────────────

fn default_log_level() -> String {
    "warn".into()
}

fn default_train_ratio() -> f64 {
    0.8
}

fn default_seed() -> u64 {
    42
}

impl Config {
    /// Load the configuration using this resolution order:
    ///
    /// 1. `explicit` path (`--config`)
    /// 2. `$KEYPHRASE_CONFIG`
    /// 3. `$XDG_CONFIG_HOME/keyphrase/config.json`
    /// 4. `~/.config/keyphrase/config.json`
    /// 5. built-in defaults
    ///
    /// Paths from 1 and 2 must exist. A discovered file that fails to parse is an error.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let xdg_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::resolve(explicit, env_path.as_deref(), xdg_home.as_deref(), home.as_deref())
    }

    fn resolve(
        explicit: Option<&Path>,
        env_path: Option<&Path>,
        xdg_home: Option<&Path>,
        home: Option<&Path>,
    ) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit.or(env_path) {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        let discovered = [
            xdg_home.map(|p| p.join("keyphrase/config.json")),
            home.map(|p| p.join(".config/keyphrase/config.json")),
        ];
        for path in discovered.into_iter().flatten() {
            if path.is_file() {
                let config = Self::from_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((Self::default_values(), None))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read '{}': {e}", path.display())))?;
        Self::parse(&json).map_err(|e| Error::Config(format!("'{}': {e}", path.display())))
    }

    pub fn parse(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if !(0.0..=1.0).contains(&config.train_ratio) {
            return Err(Error::Config(format!(
                "train_ratio must be within [0, 1], got {}",
                config.train_ratio
            )));
        }
        Ok(config)
    }

    /// Defaults, with serde defaults applied to every field.
    pub fn default_values() -> Self {
        Self {
            log_level: default_log_level(),
            train_ratio: default_train_ratio(),
            seed: default_seed(),
            ..Default::default()
        }
    }
}
