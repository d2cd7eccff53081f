use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Layout description file; empty for plain romaji on a 104-key board.
    #[serde(default = "default_keyboard_layout")]
    pub keyboard_layout: String,
    /// JIS X 4063: ん before the な row is typed `n'` too.
    #[serde(default = "default_nn_as_jis_x_4063")]
    pub nn_as_jis_x_4063: bool,
    #[serde(default = "default_min_accuracy")]
    pub min_accuracy: f64,
    #[serde(default = "default_min_wpm_per_star")]
    pub min_wpm_per_star: u32,
    #[serde(default = "default_finish_delay_ms")]
    pub finish_delay_ms: u64,
    #[serde(default = "default_lesson_dir")]
    pub lesson_dir: String,
    #[serde(default = "default_stats_file")]
    pub stats_file: String,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kanatype")
}

fn default_keyboard_layout() -> String {
    String::new()
}
fn default_nn_as_jis_x_4063() -> bool {
    true
}
fn default_min_accuracy() -> f64 {
    0.85
}
fn default_min_wpm_per_star() -> u32 {
    5
}
fn default_finish_delay_ms() -> u64 {
    1000
}
fn default_lesson_dir() -> String {
    data_dir().join("lessons").to_string_lossy().to_string()
}
fn default_stats_file() -> String {
    data_dir().join("stats.txt").to_string_lossy().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keyboard_layout: default_keyboard_layout(),
            nn_as_jis_x_4063: default_nn_as_jis_x_4063(),
            min_accuracy: default_min_accuracy(),
            min_wpm_per_star: default_min_wpm_per_star(),
            finish_delay_ms: default_finish_delay_ms(),
            lesson_dir: default_lesson_dir(),
            stats_file: default_stats_file(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads `path`; a missing file gives the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    /// Like [`Config::load`], but a broken config file is logged and the
    /// defaults are used.
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(&Self::config_path())
    }

    pub fn load_or_default_from(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("{err:#}, using default settings");
                Config::default()
            }
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
            .join("kanatype")
            .join("config.toml")
    }

    /// Puts out-of-range values back to their defaults.
    pub fn validate(&mut self) {
        if !(0.0..=1.0).contains(&self.min_accuracy) {
            self.min_accuracy = default_min_accuracy();
        }
        if self.min_wpm_per_star == 0 {
            self.min_wpm_per_star = default_min_wpm_per_star();
        }
        if self.finish_delay_ms > 10_000 {
            self.finish_delay_ms = default_finish_delay_ms();
        }
        if self.lesson_dir.is_empty() {
            self.lesson_dir = default_lesson_dir();
        }
        if self.stats_file.is_empty() {
            self.stats_file = default_stats_file();
        }
    }

    pub fn finish_delay(&self) -> Duration {
        Duration::from_millis(self.finish_delay_ms)
    }
}
