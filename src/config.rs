use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::scoring::XpRules;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub xp: XpRules,
}

/// Delays for the deferred continuations, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_mistake_revert_ms")]
    pub mistake_revert_ms: u64,
    #[serde(default = "default_word_advance_ms")]
    pub word_advance_ms: u64,
    #[serde(default = "default_option_flash_ms")]
    pub option_flash_ms: u64,
    #[serde(default = "default_mismatch_ms")]
    pub mismatch_ms: u64,
    #[serde(default = "default_round_complete_ms")]
    pub round_complete_ms: u64,
    #[serde(default = "default_unit_advance_ms")]
    pub unit_advance_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_mistake_revert_ms() -> u64 {
    500
}
fn default_word_advance_ms() -> u64 {
    300
}
fn default_option_flash_ms() -> u64 {
    600
}
fn default_mismatch_ms() -> u64 {
    800
}
fn default_round_complete_ms() -> u64 {
    500
}
fn default_unit_advance_ms() -> u64 {
    1000
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            mistake_revert_ms: default_mistake_revert_ms(),
            word_advance_ms: default_word_advance_ms(),
            option_flash_ms: default_option_flash_ms(),
            mismatch_ms: default_mismatch_ms(),
            round_complete_ms: default_round_complete_ms(),
            unit_advance_ms: default_unit_advance_ms(),
        }
    }
}

impl TimingConfig {
    pub fn mistake_revert(&self) -> Duration {
        Duration::from_millis(self.mistake_revert_ms)
    }

    pub fn word_advance(&self) -> Duration {
        Duration::from_millis(self.word_advance_ms)
    }

    pub fn option_flash(&self) -> Duration {
        Duration::from_millis(self.option_flash_ms)
    }

    pub fn mismatch(&self) -> Duration {
        Duration::from_millis(self.mismatch_ms)
    }

    pub fn round_complete(&self) -> Duration {
        Duration::from_millis(self.round_complete_ms)
    }

    pub fn unit_advance(&self) -> Duration {
        Duration::from_millis(self.unit_advance_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shuffle_seed: None,
            log_level: default_log_level(),
            timing: TimingConfig::default(),
            xp: XpRules::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing config {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lingodrill")
            .join("config.toml")
    }
}
