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

use super::types::{EncoderPreset, EncodingSpeed};
use crate::capability::RecordOptions;
use crate::messages::video::VideoConfig;
use std::path::Path;

/// Arguments for an encoder reading camera frames from stdin.
///
/// The picture is center-cropped to the aspect contract, then scaled to the
/// quality profile's height.
pub fn build_cmd(input: &VideoConfig, options: RecordOptions, encoder: EncoderPreset, speed: EncodingSpeed, output: &Path) -> Vec<String> {
    let fps = input.fps.to_string();
    let mut args: Vec<String> = match input.fmt.as_str() {
        "MJPEG" => vec!["-f".into(), "mjpeg".into(), "-framerate".into(), fps, "-i".into(), "-".into()],
        fmt => vec![
            "-f".into(), "rawvideo".into(),
            "-pixel_format".into(), if fmt == "YUYV" { "yuyv422" } else { "rgb24" }.into(),
            "-video_size".into(), format!("{}x{}", input.width, input.height),
            "-framerate".into(), fps,
            "-i".into(), "-".into()
        ]
    };

    let aspect = options.aspect_ratio;
    let (_, height) = options.quality.frame_size(aspect);
    args.push("-vf".into());
    args.push(format!(
        "crop=min(iw\\,ih*{w}/{h}):min(ih\\,iw*{h}/{w}),scale=-2:{height}",
        w = aspect.width,
        h = aspect.height
    ));

    let enc_args = match encoder {
        EncoderPreset::CPU => {
            let preset = match speed {
                EncodingSpeed::Fastest => "ultrafast",
                EncodingSpeed::Balanced => "veryfast",
                EncodingSpeed::Compact => "medium"
            };
            vec!["-c:v", "libx264", "-pix_fmt", "yuv420p", "-preset", preset, "-crf", "23"]
        },

        EncoderPreset::NVIDIA => {
            let preset = match speed {
                EncodingSpeed::Fastest => "p1",
                EncodingSpeed::Balanced => "p4",
                EncodingSpeed::Compact => "p7"
            };
            vec!["-c:v", "h264_nvenc", "-pix_fmt", "yuv420p", "-preset", preset, "-rc:v", "vbr", "-cq", "23"]
        },

        EncoderPreset::AMD => vec!["-c:v", "h264_amf", "-usage", "transcoding"],
        EncoderPreset::INTEL => vec!["-c:v", "h264_qsv", "-preset", "medium"]
    };

    args.extend(enc_args.into_iter().map(String::from));
    args.push("-y".into());
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Arguments muxing a finished video with its audio track.
pub fn build_mux_cmd(video: &Path, audio: &Path, output: &Path) -> Vec<String> {
    let (video, audio, output) = (video.to_string_lossy(), audio.to_string_lossy(), output.to_string_lossy());
    ["-i", &*video, "-i", &*audio, "-c:v", "copy", "-c:a", "aac", "-shortest", "-y", &*output]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
}
