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

use crate::capability::{CameraCapability, CaptureOutcome, CaptureToken, Facing, PreviewFrame, RecordOptions, VideoAsset};
use crate::config::AppConfig;
use crate::error::CaptureError;
use crate::messages::{camera::{CameraCommand, CameraMessage}, recorder::RecorderCommand, video::VideoConfig};
use crate::{audio, recorder};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use image::imageops::FilterType;
use nokhwa::{Camera, pixel_format::RgbFormat, utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType}};
use std::{fs, sync::Arc, thread, time::Duration};
use tracing::{debug, error, info, warn};

const PREVIEW_WIDTH: u32 = 640;
const PREVIEW_BACKLOG: usize = 4;
const IDLE_WAIT: Duration = Duration::from_millis(250);
const FRAME_RETRY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub back_index: u32,
    pub front_index: u32,
    pub facing: Facing,
    pub options: RecordOptions
}

impl CameraSettings {
    pub fn index_for(&self, facing: Facing) -> u32 {
        match facing {
            Facing::Back => self.back_index,
            Facing::Front => self.front_index
        }
    }
}

/// Preview size at a fixed width, keeping the source aspect.
fn preview_dims(width: u32, height: u32) -> (u32, u32) {
    if width == 0 {
        return (PREVIEW_WIDTH, PREVIEW_WIDTH * 3 / 4);
    }
    let h = (u64::from(PREVIEW_WIDTH) * u64::from(height) / u64::from(width)).max(1) as u32;
    (PREVIEW_WIDTH, h)
}

struct Worker {
    settings: CameraSettings,
    facing: Facing,
    wanted: Facing,
    forwarding: bool,
    camera: Option<Camera>,
    msg_tx: Sender<CameraMessage>,
    rec_tx: Sender<RecorderCommand>
}

impl Worker {
    fn report(&self, message: String) {
        error!("{}", message);
        let _ = self.msg_tx.send(CameraMessage::Error(message));
    }

    fn open(&self) -> Option<Camera> {
        let index = self.settings.index_for(self.facing);
        let (w, h) = self.settings.options.quality.frame_size(self.settings.options.aspect_ratio);
        let wanted = CameraFormat::new_from(w, h, FrameFormat::MJPEG, 30);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(wanted));

        let mut camera = match Camera::new(CameraIndex::Index(index), requested) {
            Ok(c) => c,
            Err(e) => {
                self.report(format!("{} camera (index {}) failed to open: {}", self.facing, index, e));
                return None;
            }
        };

        if let Err(e) = camera.open_stream() {
            self.report(format!("stream open failure: {}", e));
            return None;
        }

        let format = camera.camera_format();
        let config = VideoConfig {
            width: format.resolution().width(),
            height: format.resolution().height(),
            fps: format.frame_rate(),
            fmt: format.format().to_string()
        };
        info!(%config, facing = %self.facing, index, "camera stream opened");
        let _ = self.rec_tx.send(RecorderCommand::StreamFormat(config.clone()));
        let _ = self.msg_tx.send(CameraMessage::StreamStarted(config));
        Some(camera)
    }

    fn switch_if_wanted(&mut self) {
        if self.wanted == self.facing && self.camera.is_some() {
            return;
        }
        self.facing = self.wanted;
        self.camera = None;
        self.camera = self.open();
    }

    fn apply(&mut self, cmd: CameraCommand) {
        match cmd {
            CameraCommand::SetFacing(facing) => {
                self.wanted = facing;
                if self.forwarding {
                    debug!(%facing, "facing change deferred until the take ends");
                } else if facing != self.facing {
                    self.switch_if_wanted();
                }
            },
            CameraCommand::Forward(on) => {
                self.forwarding = on;
                if !on && self.wanted != self.facing {
                    self.switch_if_wanted();
                }
            }
        }
    }

    fn pump_frame(&mut self) {
        let Some(camera) = self.camera.as_mut() else { return };
        let frame = match camera.frame() {
            Ok(f) => f,
            Err(e) => {
                debug!(error = %e, "frame grab failed");
                thread::sleep(FRAME_RETRY);
                return;
            }
        };

        if self.forwarding {
            let _ = self.rec_tx.send(RecorderCommand::WriteFrame(Arc::new(frame.buffer().to_vec())));
        }

        if let Ok(decoded) = frame.decode_image::<RgbFormat>() {
            let (p_width, p_height) = preview_dims(decoded.width(), decoded.height());
            let preview = image::imageops::resize(&decoded, p_width, p_height, FilterType::Triangle);
            let _ = self.msg_tx.try_send(CameraMessage::Frame { preview: preview.into_raw(), p_width, p_height });
        }
    }
}

/// Spawns the camera worker. It owns the device, publishes preview frames and
/// feeds raw frames to the recorder while forwarding is on. It exits once its
/// command channel is dropped.
pub fn start_thread(settings: CameraSettings, msg_tx: Sender<CameraMessage>, cmd_rx: Receiver<CameraCommand>, rec_tx: Sender<RecorderCommand>) {
    thread::spawn(move || {
        let mut worker = Worker {
            settings,
            facing: settings.facing,
            wanted: settings.facing,
            forwarding: false,
            camera: None,
            msg_tx,
            rec_tx
        };
        worker.camera = worker.open();

        loop {
            loop {
                match cmd_rx.try_recv() {
                    Ok(cmd) => worker.apply(cmd),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        info!("camera worker stopping");
                        return;
                    }
                }
            }

            if worker.camera.is_some() {
                worker.pump_frame();
                continue;
            }

            match cmd_rx.recv_timeout(IDLE_WAIT) {
                Ok(cmd) => worker.apply(cmd),
                Err(RecvTimeoutError::Timeout) => {},
                Err(RecvTimeoutError::Disconnected) => return
            }
        }
    });
}

/// Camera capability backed by the local webcam, ffmpeg and the microphone.
pub struct NativeCamera {
    camera_tx: Sender<CameraCommand>,
    camera_rx: Receiver<CameraMessage>,
    rec_tx: Sender<RecorderCommand>,
    outcome_rx: Receiver<CaptureOutcome>
}

impl NativeCamera {
    pub fn spawn(config: &AppConfig) -> Self {
        let (camera_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (msg_tx, camera_rx) = crossbeam_channel::bounded(PREVIEW_BACKLOG);
        let (rec_tx, rec_rx) = crossbeam_channel::unbounded();
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded();

        let aud_tx = config.capture_audio.then(|| {
            let (aud_tx, aud_rx) = crossbeam_channel::unbounded();
            audio::start_thread(aud_rx);
            aud_tx
        });

        recorder::start_thread(config.recorder_settings(), rec_rx, outcome_tx, aud_tx);
        start_thread(config.camera_settings(), msg_tx, cmd_rx, rec_tx.clone());

        Self { camera_tx, camera_rx, rec_tx, outcome_rx }
    }
}

impl CameraCapability for NativeCamera {
    fn start_recording(&mut self, options: RecordOptions, token: CaptureToken) -> Result<(), CaptureError> {
        self.rec_tx.send(RecorderCommand::StartTake { token, options }).map_err(|_| CaptureError::Disconnected("recorder"))?;
        self.camera_tx.send(CameraCommand::Forward(true)).map_err(|_| CaptureError::Disconnected("camera"))?;
        Ok(())
    }

    fn stop_recording(&mut self) {
        if self.camera_tx.send(CameraCommand::Forward(false)).is_err() {
            warn!("camera worker is gone");
        }
        if self.rec_tx.send(RecorderCommand::EndTake).is_err() {
            warn!("recorder worker is gone");
        }
    }

    fn set_facing(&mut self, facing: Facing) {
        if self.camera_tx.send(CameraCommand::SetFacing(facing)).is_err() {
            warn!(%facing, "camera worker is gone");
        }
    }

    fn poll_outcome(&mut self) -> Option<CaptureOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    fn discard(&mut self, asset: VideoAsset) {
        match fs::remove_file(&asset.path) {
            Ok(()) => debug!(path = %asset.path.display(), "unused take deleted"),
            Err(e) => warn!(error = %e, path = %asset.path.display(), "failed to delete unused take")
        }
    }

    fn take_preview(&mut self) -> Option<PreviewFrame> {
        let mut latest = None;
        while let Ok(msg) = self.camera_rx.try_recv() {
            match msg {
                CameraMessage::Frame { preview, p_width, p_height } => latest = Some(PreviewFrame { rgb: preview, width: p_width, height: p_height }),
                CameraMessage::StreamStarted(config) => debug!(%config, "preview stream ready"),
                CameraMessage::Error(e) => debug!(error = %e, "camera worker reported an error")
            }
        }
        latest
    }
}
