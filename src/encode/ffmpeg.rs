use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::encode::job::{
    AudioOutput, EncodeFailure, EncodeJob, InputMode, VideoFilter, VideoOutput, h264_profile_for,
    track_timescale,
};
use crate::encode::process::{ProcessError, run_with_timeout, tail_lines};
use crate::foundation::error::ScenecutResult;

const STDERR_TAIL_LINES: usize = 20;

/// Executes [`EncodeJob`]s.
///
/// Implementations write exactly `job.out_path` on success. Atomic placement and strategy
/// fallback are layered on top in [`crate::encode::fallback`].
pub trait Encoder {
    fn encode(&mut self, job: &EncodeJob) -> Result<(), EncodeFailure>;
}

/// Encoder backed by the system `ffmpeg` binary.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    bin: PathBuf,
    timeout: Duration,
}

impl FfmpegEncoder {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }
}

impl Encoder for FfmpegEncoder {
    #[tracing::instrument(level = "debug", skip_all, fields(out = %job.out_path.display()))]
    fn encode(&mut self, job: &EncodeJob) -> Result<(), EncodeFailure> {
        ensure_parent_dir(&job.out_path).map_err(|e| EncodeFailure::Output {
            path: job.out_path.clone(),
            message: e.to_string(),
        })?;

        let mut cmd = Command::new(&self.bin);
        cmd.args(ffmpeg_args(job));

        let out = match run_with_timeout(&mut cmd, None, self.timeout) {
            Ok(out) => out,
            Err(ProcessError::TimedOut { after, .. }) => {
                return Err(EncodeFailure::TimedOut { after });
            }
            Err(e) => return Err(EncodeFailure::Spawn(e.to_string())),
        };
        if !out.status.success() {
            return Err(EncodeFailure::Exit {
                code: out.status.code(),
                stderr: tail_lines(&out.stderr_lossy(), STDERR_TAIL_LINES),
            });
        }
        Ok(())
    }
}

/// Build the `ffmpeg` argument list for `job`.
pub fn ffmpeg_args(job: &EncodeJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error"]
        .map(OsString::from)
        .to_vec();

    for input in &job.inputs {
        match input.mode {
            InputMode::Plain => {}
            InputMode::Loop => {
                args.push("-stream_loop".into());
                args.push("-1".into());
            }
            InputMode::ConcatList => {
                args.extend(["-f", "concat", "-safe", "0"].map(OsString::from));
            }
        }
        args.push("-i".into());
        args.push(input.path.clone().into_os_string());
    }

    match &job.filter {
        Some(VideoFilter::Chain(chain)) => {
            args.push("-vf".into());
            args.push(chain.into());
        }
        Some(VideoFilter::Graph(graph)) => {
            args.push("-filter_complex".into());
            args.push(graph.into());
        }
        None => {}
    }
    for map in &job.maps {
        args.push("-map".into());
        args.push(map.into());
    }

    match &job.video {
        VideoOutput::Copy => args.extend(["-c:v", "copy"].map(OsString::from)),
        VideoOutput::Encode {
            codec,
            bitrate,
            fps,
        } => {
            args.push("-c:v".into());
            args.push((&codec.name).into());
            if let Some(preset) = &codec.preset {
                args.push("-preset".into());
                args.push(preset.into());
            }
            if let Some((profile, level)) = h264_profile_for(&codec.name) {
                args.extend(["-profile:v", profile, "-level:v", level].map(OsString::from));
            }
            args.push("-b:v".into());
            args.push(bitrate.into());
            args.push("-r".into());
            args.push(fps.to_string().into());
            args.extend(["-pix_fmt", "yuv420p"].map(OsString::from));
            args.push("-video_track_timescale".into());
            args.push(track_timescale(*fps).to_string().into());
        }
    }

    match &job.audio {
        AudioOutput::Copy => args.extend(["-c:a", "copy"].map(OsString::from)),
        AudioOutput::Aac {
            bitrate,
            sample_rate,
            channels,
        } => {
            args.extend(["-c:a", "aac", "-b:a"].map(OsString::from));
            args.push(bitrate.into());
            args.push("-ar".into());
            args.push(sample_rate.to_string().into());
            args.push("-ac".into());
            args.push(channels.to_string().into());
        }
        AudioOutput::Disabled => args.push("-an".into()),
    }

    if let Some(d) = job.duration {
        args.push("-t".into());
        args.push(format!("{d:.3}").into());
    }
    // Explicit muxer: the output name may lack an `.mp4` extension.
    args.extend(["-movflags", "+faststart", "-f", "mp4"].map(OsString::from));
    args.push(job.out_path.clone().into_os_string());
    args
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ScenecutResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
