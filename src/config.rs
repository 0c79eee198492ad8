// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Every setting has a default, so a config file only needs the keys it
//! changes. The file is YAML and is looked up from `MEDIA_REVIEW_CONFIG`,
//! then `media-review.yaml` in the working directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "MEDIA_REVIEW_CONFIG";

/// Config file picked up from the working directory.
pub const CONFIG_FILE: &str = "media-review.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Preset user name; skips the name prompt when set.
    pub username: Option<String>,
    pub default_frame_rate: f64,
    pub default_line_width: f64,
    /// Whether the pen width can be changed from the toolbar.
    pub line_width_adjustable: bool,
    pub stroke_color: String,
    /// Whether the EDL export is offered.
    pub edl_export: bool,
    pub skip_seconds: f64,
    pub volume_step: f64,
    pub wheel_seek_seconds: f64,
    pub initial_volume: f64,
    pub seek_settle_ms: u64,
    pub autosave_minutes: u64,
    pub playback_speeds: Vec<f64>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            username: None,
            default_frame_rate: 24.0,
            default_line_width: 15.0,
            line_width_adjustable: true,
            stroke_color: "#ff0000".to_string(),
            edl_export: true,
            skip_seconds: 5.0,
            volume_step: 0.1,
            wheel_seek_seconds: 60.0,
            initial_volume: 0.7,
            seek_settle_ms: 100,
            autosave_minutes: 5,
            playback_speeds: vec![0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 3.0, 4.0],
        }
    }
}

impl ReviewConfig {
    pub fn seek_settle(&self) -> Duration {
        Duration::from_millis(self.seek_settle_ms)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_minutes.max(1) * 60)
    }

    /// Parse a YAML config document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config = serde_yaml::from_str(text)?;
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Load from the environment or working directory, falling back to
    /// defaults when neither names a file.
    pub fn discover() -> Result<Self> {
        match config_path() {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(CONFIG_FILE);
    local.exists().then_some(local)
}
