// Copyright (C) 2025 Joshua Kesler
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use crate::camera::CameraSettings;
use crate::capability::{Facing, RecordOptions, VideoQuality};
use crate::recorder::types::{EncoderPreset, EncodingSpeed, RecorderSettings};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_ENV: &str = "CAPTURE_OVERLAY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "capture-overlay.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Show the overlay as soon as the window appears.
    pub open_on_launch: bool,
    pub quality: VideoQuality,
    pub facing: Facing,
    pub back_camera_index: u32,
    pub front_camera_index: u32,
    pub capture_audio: bool,
    pub output_dir: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub encoder: EncoderPreset,
    pub speed: EncodingSpeed
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            open_on_launch: false,
            quality: VideoQuality::P720,
            facing: Facing::Back,
            back_camera_index: 0,
            front_camera_index: 1,
            capture_audio: true,
            output_dir: std::env::temp_dir().join("capture-overlay"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            encoder: EncoderPreset::CPU,
            speed: EncodingSpeed::Balanced
        }
    }
}

impl AppConfig {
    /// Config path from the environment, falling back to the working directory.
    pub fn locate() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn record_options(&self) -> RecordOptions {
        RecordOptions { quality: self.quality, ..RecordOptions::default() }
    }

    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            back_index: self.back_camera_index,
            front_index: self.front_camera_index,
            facing: self.facing,
            options: self.record_options()
        }
    }

    pub fn recorder_settings(&self) -> RecorderSettings {
        RecorderSettings {
            ffmpeg: self.ffmpeg_path.clone(),
            output_dir: self.output_dir.clone(),
            encoder: self.encoder,
            speed: self.speed,
            capture_audio: self.capture_audio
        }
    }
}
