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

pub mod types;
mod ffmpeg;

use crate::capability::{CaptureOutcome, CaptureToken, RecordOptions, VideoAsset};
use crate::error::CaptureError;
use crate::messages::{audio::AudioCommand, recorder::RecorderCommand, video::VideoConfig};
use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender};
use std::{fs, io::{self, Write}, path::PathBuf, process::{Child, Command, ExitStatus, Stdio}, thread, time::{Duration, Instant}};
use tracing::{debug, info, warn};
use types::RecorderSettings;

const AUDIO_ACK_TIMEOUT: Duration = Duration::from_secs(2);

struct ActiveTake {
    token: CaptureToken,
    options: RecordOptions,
    process: Child,
    video_path: PathBuf,
    final_path: PathBuf,
    audio_path: Option<PathBuf>,
    started: Instant,
    recorded_at: DateTime<Local>,
    write_failed: bool
}

impl ActiveTake {
    fn write(&mut self, data: &[u8]) {
        if self.write_failed {
            return;
        }
        if let Some(stdin) = self.process.stdin.as_mut() {
            if let Err(e) = stdin.write_all(data) {
                warn!(error = %e, token = %self.token, "encoder stopped accepting frames");
                self.write_failed = true;
            }
        }
    }
}

/// Spawns the recorder worker. Each take pipes camera frames into its own
/// encoder process; the result of every take is reported on `outcome_tx`.
pub fn start_thread(settings: RecorderSettings, cmd_rx: Receiver<RecorderCommand>, outcome_tx: Sender<CaptureOutcome>, aud_tx: Option<Sender<AudioCommand>>) {
    thread::spawn(move || {
        let mut stream: Option<VideoConfig> = None;
        let mut take: Option<ActiveTake> = None;

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                RecorderCommand::StreamFormat(config) => {
                    info!(%config, "recorder input format updated");
                    stream = Some(config);
                },
                RecorderCommand::StartTake { token, options } => {
                    if let Some(previous) = take.take() {
                        warn!(token = %previous.token, "take superseded before it ended");
                        let _ = outcome_tx.send(finish_take(previous, &settings, aud_tx.as_ref()));
                    }

                    match begin_take(token, options, stream.as_ref(), &settings, aud_tx.as_ref()) {
                        Ok(active) => take = Some(active),
                        Err(e) => { let _ = outcome_tx.send(CaptureOutcome { token, result: Err(e) }); }
                    }
                },
                RecorderCommand::WriteFrame(data) => {
                    if let Some(active) = take.as_mut() {
                        active.write(&data);
                    }
                },
                RecorderCommand::EndTake => match take.take() {
                    Some(active) => { let _ = outcome_tx.send(finish_take(active, &settings, aud_tx.as_ref())); },
                    None => debug!("end of take with nothing recording")
                }
            }
        }

        if let Some(active) = take.take() {
            let outcome = finish_take(active, &settings, aud_tx.as_ref());
            debug!(token = %outcome.token, ok = outcome.result.is_ok(), "take flushed on shutdown");
        }
    });
}

fn begin_take(token: CaptureToken, options: RecordOptions, stream: Option<&VideoConfig>, settings: &RecorderSettings, aud_tx: Option<&Sender<AudioCommand>>) -> Result<ActiveTake, CaptureError> {
    let input = stream.ok_or(CaptureError::NoStream)?;
    fs::create_dir_all(&settings.output_dir)?;

    let recorded_at = Local::now();
    let stem = format!("take_{}_{}", recorded_at.format("%Y%m%d_%H%M%S"), token);
    let video_path = settings.output_dir.join(format!("{stem}.video.mp4"));
    let final_path = settings.output_dir.join(format!("{stem}.mp4"));

    let args = ffmpeg::build_cmd(input, options, settings.encoder, settings.speed, &video_path);
    let process = Command::new(&settings.ffmpeg)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(CaptureError::Spawn)?;

    let audio_path = match aud_tx {
        Some(tx) if settings.capture_audio => start_audio(tx, settings.output_dir.join(format!("{stem}.wav"))),
        _ => None
    };

    info!(%token, input = %input, quality = %options.quality, audio = audio_path.is_some(), "take started");
    Ok(ActiveTake {
        token,
        options,
        process,
        video_path,
        final_path,
        audio_path,
        started: Instant::now(),
        recorded_at,
        write_failed: false
    })
}

fn start_audio(tx: &Sender<AudioCommand>, path: PathBuf) -> Option<PathBuf> {
    let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
    if tx.send(AudioCommand::StartRecording(path.clone(), ack_tx)).is_err() {
        warn!("audio worker unavailable, recording video only");
        return None;
    }

    match ack_rx.recv_timeout(AUDIO_ACK_TIMEOUT) {
        Ok(Ok(())) => Some(path),
        Ok(Err(e)) => {
            warn!(error = %CaptureError::Audio(e), "recording video only");
            None
        },
        Err(_) => {
            warn!("audio worker did not answer, recording video only");
            None
        }
    }
}

fn stop_audio(tx: Option<&Sender<AudioCommand>>, path: PathBuf) -> Option<PathBuf> {
    let tx = tx?;
    let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
    if tx.send(AudioCommand::StopRecording(ack_tx)).is_err() || ack_rx.recv_timeout(AUDIO_ACK_TIMEOUT).is_err() {
        warn!("audio worker disconnected during flush");
    }
    path.exists().then_some(path)
}

fn finish_take(mut take: ActiveTake, settings: &RecorderSettings, aud_tx: Option<&Sender<AudioCommand>>) -> CaptureOutcome {
    let duration = take.started.elapsed();
    drop(take.process.stdin.take());
    let status = take.process.wait();
    let audio = take.audio_path.take().and_then(|p| stop_audio(aud_tx, p));

    let result = finalize(&take, status, audio, duration, settings);
    if let Err(e) = &result {
        let _ = fs::remove_file(&take.video_path);
        debug!(error = %e, token = %take.token, "take discarded");
    }
    CaptureOutcome { token: take.token, result }
}

fn finalize(take: &ActiveTake, status: io::Result<ExitStatus>, audio: Option<PathBuf>, duration: Duration, settings: &RecorderSettings) -> Result<VideoAsset, CaptureError> {
    let status = status?;
    if !status.success() {
        return Err(CaptureError::Encoder(status.to_string()));
    }
    if !take.video_path.exists() {
        return Err(CaptureError::MissingOutput(take.video_path.clone()));
    }

    let has_audio = match audio {
        Some(wav) => {
            let merged = mux(settings, take, &wav);
            let _ = fs::remove_file(&wav);
            merged
        },
        None => false
    };

    if has_audio {
        let _ = fs::remove_file(&take.video_path);
    } else {
        fs::rename(&take.video_path, &take.final_path)?;
    }

    let (width, height) = take.options.quality.frame_size(take.options.aspect_ratio);
    info!(path = %take.final_path.display(), seconds = duration.as_secs_f64(), has_audio, "take saved");
    Ok(VideoAsset {
        path: take.final_path.clone(),
        duration,
        width,
        height,
        has_audio,
        recorded_at: take.recorded_at
    })
}

fn mux(settings: &RecorderSettings, take: &ActiveTake, wav: &std::path::Path) -> bool {
    let args = ffmpeg::build_mux_cmd(&take.video_path, wav, &take.final_path);
    match Command::new(&settings.ffmpeg).args(&args).stdout(Stdio::null()).stderr(Stdio::inherit()).status() {
        Ok(s) if s.success() => true,
        Ok(s) => {
            warn!(status = %s, "audio merge failed, keeping video only");
            false
        },
        Err(e) => {
            warn!(error = %e, "audio merge failed, keeping video only");
            false
        }
    }
}
