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

use crate::camera::NativeCamera;
use crate::capability::VideoAsset;
use crate::overlay::{VideoCaptureOverlay, view::OverlayView};
use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use eframe::{egui, App, Frame};
use std::{fs, path::{Path, PathBuf}, time::Instant};
use tracing::{error, info};

/// Minimal window hosting the capture overlay.
pub struct HostApp {
    overlay: VideoCaptureOverlay<NativeCamera>,
    view: OverlayView,
    saved_tx: Sender<VideoAsset>,
    saved_rx: Receiver<VideoAsset>,
    last_saved: Option<PathBuf>,
    last_error: Option<String>
}

impl HostApp {
    pub fn new(_cc: &eframe::CreationContext, overlay: VideoCaptureOverlay<NativeCamera>) -> Self {
        let (saved_tx, saved_rx) = crossbeam_channel::unbounded();
        Self {
            overlay,
            view: OverlayView::new(),
            saved_tx,
            saved_rx,
            last_saved: None,
            last_error: None
        }
    }

    fn open_recorder(&mut self) {
        let tx = self.saved_tx.clone();
        self.last_error = None;
        self.overlay.open(move |asset| {
            let _ = tx.send(asset);
        });
    }

    fn export(&mut self, asset: VideoAsset) {
        let name = asset.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| String::from("video.mp4"));
        let choice = rfd::FileDialog::new()
            .add_filter("video", &["mp4"])
            .set_file_name(name)
            .save_file();

        let Some(dest) = choice else {
            info!(path = %asset.path.display(), "save cancelled, take left in place");
            self.last_saved = Some(asset.path);
            return;
        };

        match export_to(&asset, &dest) {
            Ok(path) => self.last_saved = Some(path),
            Err(e) => {
                error!(error = ?e, "failed to save video");
                self.last_error = Some(format!("{:#}", e));
            }
        }
    }
}

/// Copies a finished take to `dest`.
pub fn export_to(asset: &VideoAsset, dest: &Path) -> anyhow::Result<PathBuf> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::copy(&asset.path, dest).with_context(|| format!("failed to copy {} to {}", asset.path.display(), dest.display()))?;
    info!(from = %asset.path.display(), to = %dest.display(), "video saved");
    Ok(dest.to_path_buf())
}

impl App for HostApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        while let Ok(asset) = self.saved_rx.try_recv() {
            self.export(asset);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading("Video Capture");
                ui.add_space(20.0);
                if ui.button("Record video").clicked() {
                    self.open_recorder();
                }

                if let Some(path) = &self.last_saved {
                    ui.colored_label(egui::Color32::GREEN, format!("Saved: {}", path.display()));
                }
                if let Some(e) = &self.last_error {
                    ui.colored_label(egui::Color32::RED, e);
                }
            });
        });

        self.view.show(ctx, &mut self.overlay);
        self.overlay.pump(Instant::now());
        ctx.request_repaint();
    }
}
