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

use capture_overlay::{app::HostApp, camera::NativeCamera, config::AppConfig, VideoCaptureOverlay};
use eframe::NativeOptions;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("capture_overlay=info")))
        .init();

    let config = AppConfig::load(&AppConfig::locate())?;
    let mut overlay = VideoCaptureOverlay::new(config.record_options())
        .with_initial_open(config.open_on_launch)
        .with_facing(config.facing);
    overlay.mount(NativeCamera::spawn(&config));

    let options = NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([800.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native("Video Capture", options, Box::new(|cc| {
        Ok(Box::new(HostApp::new(cc, overlay)))
    })).map_err(|e| anyhow::anyhow!("ui terminated: {e}"))
}
