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

use eframe::egui;

const LONG_SIDE: f32 = 4.0;
const SHORT_SIDE: f32 = 3.0;

/// Size of the 4:3 camera preview inside a `width` x `height` viewport.
///
/// Portrait viewports keep the full width; anything else keeps the full height.
pub fn preview_size(width: f32, height: f32) -> egui::Vec2 {
    if height > width {
        egui::vec2(width, width * LONG_SIDE / SHORT_SIDE)
    } else {
        egui::vec2(height * LONG_SIDE / SHORT_SIDE, height)
    }
}
