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

use crate::messages::audio::AudioCommand;
use cpal::{StreamError, traits::{DeviceTrait, HostTrait, StreamTrait}};
use crossbeam_channel::Receiver;
use std::{fs::File, io::BufWriter, path::Path, sync::{Arc, Mutex}, thread};
use tracing::{error, info, warn};

type WavSink = Arc<Mutex<Option<hound::WavWriter<BufWriter<File>>>>>;

/// Spawns the microphone worker. The input stream is opened lazily on the
/// first take and reused; each take writes its own WAV file.
pub fn start_thread(cmd_rx: Receiver<AudioCommand>) {
    thread::spawn(move || {
        let host = cpal::default_host();
        let device = host.default_input_device();
        match &device {
            Some(d) => info!(device = %d.name().unwrap_or_else(|_| String::from("unknown")), "audio input selected"),
            None => warn!("no audio input device, takes will be silent")
        }

        let mut active_stream: Option<cpal::Stream> = None;
        let sink: WavSink = Arc::new(Mutex::new(None));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::StartRecording(path, ack_tx) => {
                    let result = match &device {
                        Some(d) => begin(d, &path, &sink, &mut active_stream),
                        None => Err(String::from("no audio input device"))
                    };
                    let _ = ack_tx.send(result);
                },
                AudioCommand::StopRecording(ack_tx) => {
                    if let Ok(mut guard) = sink.lock() {
                        if let Some(writer) = guard.take() {
                            if let Err(e) = writer.finalize() {
                                error!(error = %e, "failed to flush audio to disk");
                            }
                        }
                    }
                    let _ = ack_tx.send(());
                }
            }
        }
    });
}

fn begin(device: &cpal::Device, path: &Path, sink: &WavSink, active_stream: &mut Option<cpal::Stream>) -> Result<(), String> {
    let config = device.default_input_config().map_err(|e| format!("failed to get microphone config: {}", e))?;
    let spec = hound::WavSpec {
        channels: config.channels(),
        sample_rate: config.sample_rate().0,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float
    };

    let writer = hound::WavWriter::create(path, spec).map_err(|e| format!("could not create WAV file: {}", e))?;
    *sink.lock().map_err(|_| String::from("audio mutex poisoned"))? = Some(writer);

    if active_stream.is_none() {
        let data_sink = sink.clone();
        let err_fn = |err: StreamError| error!(error = %err, "audio stream lost");
        let data_fn = move |data: &[f32], _: &_| {
            if let Ok(mut guard) = data_sink.lock() {
                if let Some(writer) = guard.as_mut() {
                    for &sample in data {
                        let _ = writer.write_sample(sample);
                    }
                }
            }
        };

        let stream = device.build_input_stream(&config.into(), data_fn, err_fn, None)
            .map_err(|e| format!("failed to build stream: {}", e))?;
        stream.play().map_err(|e| format!("failed to play stream: {}", e))?;
        *active_stream = Some(stream);
    }

    info!(path = %path.display(), "audio take started");
    Ok(())
}
