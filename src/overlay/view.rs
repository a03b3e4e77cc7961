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

use super::{layout::preview_size, record_button::RecordButton, timer::format_elapsed, OverlayIntent, VideoCaptureOverlay};
use crate::capability::{CameraCapability, PreviewFrame};
use eframe::egui;
use tracing::debug;

const CONTROL_BAR_OFFSET: f32 = 56.0;

/// egui presentation of a [`VideoCaptureOverlay`].
#[derive(Default)]
pub struct OverlayView {
    preview: Option<egui::TextureHandle>
}

impl OverlayView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the overlay on top of everything else and applies whatever the
    /// user clicked. Draws nothing until the overlay is ready and visible.
    pub fn show<C: CameraCapability>(&mut self, ctx: &egui::Context, overlay: &mut VideoCaptureOverlay<C>) {
        if let Some(frame) = overlay.camera_mut().and_then(|c| c.take_preview()) {
            self.upload(ctx, frame);
        }

        if !overlay.is_ready() || !overlay.is_visible() {
            return;
        }

        let mut intents = Vec::new();
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            intents.push(OverlayIntent::Close);
        }

        let screen = ctx.screen_rect();
        egui::Area::new(egui::Id::new("capture_overlay"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| self.paint(ui, screen, overlay, &mut intents));

        for intent in intents {
            overlay.handle(intent);
        }
    }

    fn paint<C: CameraCapability>(&self, ui: &mut egui::Ui, screen: egui::Rect, overlay: &VideoCaptureOverlay<C>, intents: &mut Vec<OverlayIntent>) {
        let backdrop = ui.interact(screen, ui.id().with("backdrop"), egui::Sense::click());
        ui.painter().rect_filled(screen, 0.0, egui::Color32::from_black_alpha(180));

        let preview = egui::Rect::from_center_size(screen.center(), preview_size(screen.width(), screen.height()));
        ui.interact(preview, ui.id().with("preview"), egui::Sense::click());

        match &self.preview {
            Some(texture) => {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                ui.painter().image(texture.id(), preview, uv, egui::Color32::WHITE);
            }
            None => {
                ui.painter().rect_filled(preview, 0.0, egui::Color32::from_gray(20));
                ui.painter().text(preview.center(), egui::Align2::CENTER_CENTER, "Waiting for camera...", egui::FontId::proportional(18.0), egui::Color32::GRAY);
            }
        }

        if overlay.is_recording() || overlay.has_recorded_asset() {
            paint_duration(ui, preview, overlay.elapsed_seconds());
        }

        let bar = egui::pos2(preview.center().x, preview.bottom() - CONTROL_BAR_OFFSET);
        let flip_rect = egui::Rect::from_center_size(bar - egui::vec2(120.0, 0.0), egui::vec2(72.0, 40.0));
        if ui.put(flip_rect, egui::Button::new("Flip")).clicked() {
            intents.push(OverlayIntent::Flip);
        }

        let diameter = record_diameter(preview.width());
        let button = RecordButton::new(overlay.is_recording()).diameter(diameter);
        let intent = button.intent();
        if ui.put(egui::Rect::from_center_size(bar, egui::vec2(diameter, diameter)), button).clicked() {
            intents.push(intent);
        }

        if overlay.has_recorded_asset() {
            let save_rect = egui::Rect::from_center_size(bar + egui::vec2(120.0, 0.0), egui::vec2(72.0, 40.0));
            if ui.put(save_rect, egui::Button::new("Save")).clicked() {
                intents.push(OverlayIntent::Confirm);
            }
        }

        let close_rect = egui::Rect::from_min_size(screen.right_top() + egui::vec2(-56.0, 16.0), egui::vec2(40.0, 40.0));
        if ui.put(close_rect, egui::Button::new(egui::RichText::new("✖").size(22.0))).clicked() {
            intents.push(OverlayIntent::Close);
        }

        if backdrop.clicked() {
            intents.push(OverlayIntent::Close);
        }
    }

    fn upload(&mut self, ctx: &egui::Context, frame: PreviewFrame) {
        let (w, h) = (frame.width as usize, frame.height as usize);
        if frame.rgb.len() != w * h * 3 {
            debug!(w, h, len = frame.rgb.len(), "skipping malformed preview frame");
            return;
        }

        let image = egui::ColorImage::from_rgb([w, h], &frame.rgb);
        if let Some(texture) = self.preview.as_mut() {
            texture.set(image, egui::TextureOptions::LINEAR);
            return;
        }
        self.preview = Some(ctx.load_texture("camera-preview", image, egui::TextureOptions::LINEAR));
    }
}

/// Record control size for a preview of the given width.
fn record_diameter(preview_width: f32) -> f32 {
    (preview_width / 6.0).clamp(48.0, 72.0)
}

fn paint_duration(ui: &egui::Ui, preview: egui::Rect, seconds: u64) {
    let painter = ui.painter();
    let galley = painter.layout_no_wrap(format_elapsed(seconds), egui::FontId::proportional(20.0), egui::Color32::WHITE);
    let size = galley.size();
    let pos = egui::pos2(preview.center().x - size.x / 2.0 + 8.0, preview.top() + 16.0);
    painter.circle_filled(pos + egui::vec2(-14.0, size.y / 2.0), 6.0, egui::Color32::RED);
    painter.galley(pos, galley, egui::Color32::WHITE);
}
