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

use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

#[derive(Debug, Clone, PartialEq, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPreset {
    #[default]
    CPU,
    NVIDIA,
    AMD,
    INTEL
}

impl fmt::Display for EncoderPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderPreset::CPU => write!(f, "CPU (libx264)"),
            EncoderPreset::NVIDIA => write!(f, "NVIDIA (NVENC)"),
            EncoderPreset::AMD => write!(f, "AMD (AMF)"),
            EncoderPreset::INTEL => write!(f, "Intel (QuickSync)")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingSpeed {
    Fastest,
    #[default]
    Balanced,
    Compact
}

impl fmt::Display for EncodingSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingSpeed::Fastest => write!(f, "Fastest (Low CPU)"),
            EncodingSpeed::Balanced => write!(f, "Balanced"),
            EncodingSpeed::Compact => write!(f, "Compact (High CPU, Smaller file)")
        }
    }
}

/// Everything the recorder worker needs besides per-take options.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderSettings {
    pub ffmpeg: PathBuf,
    pub output_dir: PathBuf,
    pub encoder: EncoderPreset,
    pub speed: EncodingSpeed,
    pub capture_audio: bool
}
