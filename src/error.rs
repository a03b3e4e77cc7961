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

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a take can fail inside the camera capability.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera stream is not running")]
    NoStream,

    #[error("failed to launch encoder: {0}")]
    Spawn(std::io::Error),

    #[error("encoder exited with {0}")]
    Encoder(String),

    #[error("recording produced no output at {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("audio capture failed: {0}")]
    Audio(String),

    #[error("{0} worker is gone")]
    Disconnected(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
