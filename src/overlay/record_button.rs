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

use super::OverlayIntent;
use eframe::egui;

/// Round record/stop control.
pub struct RecordButton {
    is_recording: bool,
    diameter: f32
}

impl RecordButton {
    pub fn new(is_recording: bool) -> Self {
        Self { is_recording, diameter: 64.0 }
    }

    pub fn diameter(mut self, diameter: f32) -> Self {
        self.diameter = diameter;
        self
    }

    /// The intent a click raises in the current state.
    pub fn intent(&self) -> OverlayIntent {
        if self.is_recording { OverlayIntent::Stop } else { OverlayIntent::Start }
    }
}

impl egui::Widget for RecordButton {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(egui::vec2(self.diameter, self.diameter), egui::Sense::click());
        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let center = rect.center();
            let radius = self.diameter / 2.0;
            let red = if response.hovered() { egui::Color32::from_rgb(255, 80, 80) } else { egui::Color32::from_rgb(230, 40, 40) };

            painter.circle_stroke(center, radius - 2.0, egui::Stroke::new(4.0, egui::Color32::WHITE));
            if self.is_recording {
                let side = radius * 0.8;
                painter.rect_filled(egui::Rect::from_center_size(center, egui::vec2(side, side)), 6.0, red);
            } else {
                painter.circle_filled(center, radius - 8.0, red);
            }
        }
        response
    }
}
