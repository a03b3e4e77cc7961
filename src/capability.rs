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

use crate::error::CaptureError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Front,
    #[default]
    Back
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Front => write!(f, "front"),
            Facing::Back => write!(f, "back")
        }
    }
}

/// Target quality profile, named after the output frame height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoQuality {
    #[serde(rename = "480p")]
    P480,
    #[default]
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "2160p")]
    P2160
}

impl VideoQuality {
    pub fn height(self) -> u32 {
        match self {
            VideoQuality::P480 => 480,
            VideoQuality::P720 => 720,
            VideoQuality::P1080 => 1080,
            VideoQuality::P2160 => 2160
        }
    }

    /// Frame size for this profile under `aspect`, width rounded down to an even number.
    pub fn frame_size(self, aspect: AspectRatio) -> (u32, u32) {
        let height = self.height();
        let width = height * aspect.width / aspect.height;
        (width & !1, height)
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32
}

impl AspectRatio {
    pub const FOUR_BY_THREE: AspectRatio = AspectRatio { width: 4, height: 3 };
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOptions {
    pub quality: VideoQuality,
    pub aspect_ratio: AspectRatio
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self { quality: VideoQuality::P720, aspect_ratio: AspectRatio::FOUR_BY_THREE }
    }
}

/// Identifies one capture attempt. Results carrying a stale token are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CaptureToken(pub u64);

impl CaptureToken {
    pub fn next(self) -> Self {
        CaptureToken(self.0.wrapping_add(1))
    }
}

impl fmt::Display for CaptureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finished recording as handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAsset {
    pub path: PathBuf,
    pub duration: Duration,
    pub width: u32,
    pub height: u32,
    pub has_audio: bool,
    pub recorded_at: DateTime<Local>
}

#[derive(Debug)]
pub struct CaptureOutcome {
    pub token: CaptureToken,
    pub result: Result<VideoAsset, CaptureError>
}

/// Downscaled RGB frame for the on-screen preview.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32
}

/// Hardware-backed recording, driven by the overlay.
///
/// `start_recording` only queues the request; the finished take (or its
/// failure) arrives later through `poll_outcome` tagged with the same token.
pub trait CameraCapability {
    fn start_recording(&mut self, options: RecordOptions, token: CaptureToken) -> Result<(), CaptureError>;

    fn stop_recording(&mut self);

    fn set_facing(&mut self, facing: Facing);

    fn poll_outcome(&mut self) -> Option<CaptureOutcome>;

    /// Called for finished takes nobody will receive.
    fn discard(&mut self, _asset: VideoAsset) {}

    fn take_preview(&mut self) -> Option<PreviewFrame> {
        None
    }
}
