use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::encode::process::run_capturing_stdout;
use crate::foundation::error::{ScenecutError, ScenecutResult};

/// What `ffprobe` reports about a media file.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    pub duration_sec: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub has_video: bool,
    pub has_audio: bool,
}

/// Duration of a PCM WAV file from its header.
pub fn wav_duration(path: &Path) -> ScenecutResult<f64> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        ScenecutError::validation(format!("read wav header '{}': {e}", path.display()))
    })?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(ScenecutError::validation(format!(
            "wav '{}' has a zero sample rate",
            path.display()
        )));
    }
    // `duration()` counts frames, i.e. samples per channel.
    Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

/// Probe a media file with `ffprobe`, killing the probe once `timeout` elapses.
pub fn probe_media(ffprobe: &Path, path: &Path, timeout: Duration) -> ScenecutResult<MediaInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let mut cmd = Command::new(ffprobe);
    cmd.args([
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_streams",
        "-show_format",
    ])
    .arg(path);
    let out = run_capturing_stdout(&mut cmd, timeout).map_err(|e| {
        ScenecutError::validation(format!("failed to run '{}': {e}", ffprobe.display()))
    })?;
    if !out.status.success() {
        return Err(ScenecutError::validation(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            out.stderr_lossy()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ScenecutError::serde(format!("ffprobe json parse failed: {e}")))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| {
            ScenecutError::validation(format!(
                "ffprobe reported no duration for '{}'",
                path.display()
            ))
        })?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    Ok(MediaInfo {
        duration_sec,
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
        has_video: video.is_some(),
        has_audio: parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio")),
    })
}

/// Duration in seconds: WAV headers are read directly, anything else goes through `ffprobe`.
pub fn media_duration(ffprobe: &Path, path: &Path, timeout: Duration) -> ScenecutResult<f64> {
    let is_wav = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
    if is_wav {
        wav_duration(path)
    } else {
        Ok(probe_media(ffprobe, path, timeout)?.duration_sec)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
