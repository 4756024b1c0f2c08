//! Typed runtime configuration, loaded from a JSON file.
//!
//! Every field has a default so a partial (or absent) file still yields a
//! runnable configuration; an absent LED port runs the channel in its
//! degraded no-hardware mode.

use pairlight_core::constants::{DEFAULT_BAUD_RATE, DEFAULT_MAX_PLAY_SECS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub led: LedSection,
    pub game: GameSection,
    pub reserved: ReservedSection,
}

/// LED strip link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedSection {
    /// Serial port of the strip's microcontroller. `None` disables hardware.
    pub port: Option<String>,

    pub baud_rate: u32,
}

impl Default for LedSection {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

/// Game files and timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSection {
    pub barcode_file: PathBuf,
    pub highscore_file: PathBuf,
    pub image_dir: PathBuf,
    pub max_play_secs: u64,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            barcode_file: PathBuf::from("barcodes.txt"),
            highscore_file: PathBuf::from("highscores.txt"),
            image_dir: PathBuf::from("images"),
            max_play_secs: DEFAULT_MAX_PLAY_SECS,
        }
    }
}

/// Tokens reserved for administrative actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservedSection {
    pub reset: String,
    pub print: String,
}

impl Default for ReservedSection {
    fn default() -> Self {
        Self {
            reset: "CMD-RESET".to_string(),
            print: "CMD-PRINT".to_string(),
        }
    }
}

impl Config {
    /// Load the configuration from a JSON file.
    ///
    /// A missing file yields the defaults with a warning; a present but
    /// malformed file is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
