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

use crate::capability::Facing;
use crate::messages::video::VideoConfig;

pub enum CameraMessage {
    Frame {
        preview: Vec<u8>,
        p_width: u32,
        p_height: u32
    },
    StreamStarted(VideoConfig),
    Error(String)
}

pub enum CameraCommand {
    SetFacing(Facing),
    /// Toggles forwarding of raw frames to the recorder.
    Forward(bool)
}
