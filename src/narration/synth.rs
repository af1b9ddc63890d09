use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::assets::media::media_duration;
use crate::assets::paths::AssetPaths;
use crate::encode::process::{run_with_timeout, tail_lines};
use crate::foundation::config::CommandSpec;
use crate::foundation::error::{ScenecutError, ScenecutResult};

/// Synthesized narration for one scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Narration {
    pub audio_file: PathBuf,
    /// Measured from the audio file; authoritative for timing.
    pub duration_sec: f64,
}

pub trait Synthesizer {
    fn synthesize(&mut self, scene_id: u32, text: &str) -> ScenecutResult<Narration>;
}

/// External text-to-speech program.
///
/// Narration text goes to stdin; `{out}` in the arguments is replaced by the target WAV path
/// (`audio_dir/scene_{id:03}.wav`) and `{scene_id}` by the scene id.
#[derive(Clone, Debug)]
pub struct CommandSynthesizer {
    spec: CommandSpec,
    paths: AssetPaths,
    ffprobe: PathBuf,
    timeout: Duration,
}

impl CommandSynthesizer {
    pub fn new(
        spec: CommandSpec,
        paths: AssetPaths,
        ffprobe: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            spec,
            paths,
            ffprobe: ffprobe.into(),
            timeout,
        }
    }
}

impl Synthesizer for CommandSynthesizer {
    fn synthesize(&mut self, scene_id: u32, text: &str) -> ScenecutResult<Narration> {
        let out = self.paths.audio(scene_id);
        crate::encode::ffmpeg::ensure_parent_dir(&out)?;

        let id = scene_id.to_string();
        let out_arg = out.to_string_lossy().to_string();
        let mut cmd = self
            .spec
            .command(&[("scene_id", id.as_str()), ("out", out_arg.as_str())]);
        let result = run_with_timeout(&mut cmd, Some(text.as_bytes()), self.timeout)
            .map_err(|e| ScenecutError::narration(scene_id, e.to_string()))?;
        if !result.status.success() {
            return Err(ScenecutError::narration(
                scene_id,
                format!(
                    "'{}' exited with {}: {}",
                    self.spec.program,
                    result.status,
                    tail_lines(&result.stderr_lossy(), 10)
                ),
            ));
        }
        measure(scene_id, &self.ffprobe, out, self.timeout)
    }
}

/// Narration recorded ahead of time at `audio_dir/scene_{id:03}.wav`.
#[derive(Clone, Debug)]
pub struct PrerecordedNarration {
    paths: AssetPaths,
    ffprobe: PathBuf,
    timeout: Duration,
}

impl PrerecordedNarration {
    /// `timeout` bounds the `ffprobe` call for recordings that are not WAV.
    pub fn new(paths: AssetPaths, ffprobe: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            paths,
            ffprobe: ffprobe.into(),
            timeout,
        }
    }
}

impl Synthesizer for PrerecordedNarration {
    fn synthesize(&mut self, scene_id: u32, _text: &str) -> ScenecutResult<Narration> {
        let path = self.paths.audio(scene_id);
        if !path.is_file() {
            return Err(ScenecutError::narration(
                scene_id,
                format!("no recording at '{}'", path.display()),
            ));
        }
        measure(scene_id, &self.ffprobe, path, self.timeout)
    }
}

fn measure(
    scene_id: u32,
    ffprobe: &Path,
    audio_file: PathBuf,
    timeout: Duration,
) -> ScenecutResult<Narration> {
    let duration_sec = media_duration(ffprobe, &audio_file, timeout)
        .map_err(|e| ScenecutError::narration(scene_id, e.to_string()))?;
    if !duration_sec.is_finite() || duration_sec <= 0.0 {
        return Err(ScenecutError::narration(
            scene_id,
            format!(
                "'{}' has no playable audio (duration {duration_sec})",
                audio_file.display()
            ),
        ));
    }
    debug!(scene_id, duration_sec, path = %audio_file.display(), "measured narration");
    Ok(Narration {
        audio_file,
        duration_sec,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/narration/synth.rs"]
mod tests;
