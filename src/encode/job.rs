use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foundation::config::{EncoderConfig, VideoConfig};

/// Speed/quality trade-off, mapped onto each codec family's own preset names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Fast,
    #[default]
    Balanced,
    Quality,
}

impl QualityPreset {
    /// Preset argument for `codec`, or `None` when the codec takes no `-preset`.
    pub fn preset_for(self, codec: &str) -> Option<&'static str> {
        if codec.contains("nvenc") {
            Some(match self {
                Self::Fast => "p2",
                Self::Balanced => "p4",
                Self::Quality => "p6",
            })
        } else if codec.contains("qsv") {
            Some(match self {
                Self::Fast => "veryfast",
                Self::Balanced => "medium",
                Self::Quality => "veryslow",
            })
        } else if codec == "libx264" || codec == "libx265" {
            Some(match self {
                Self::Fast => "veryfast",
                Self::Balanced => "medium",
                Self::Quality => "slow",
            })
        } else {
            None
        }
    }
}

/// H.264 profile and level for `codec`, or `None` for encoders outside the H.264 family.
///
/// Every encoder produces the same profile and level so scene files from the hardware and
/// software encoders carry matching parameter sets.
pub fn h264_profile_for(codec: &str) -> Option<(&'static str, &'static str)> {
    codec.contains("264").then_some(("high", "4.1"))
}

/// MP4 track timescale for `fps`, pinned so every scene file shares one time base.
pub fn track_timescale(fps: u32) -> u32 {
    fps.saturating_mul(1000)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncoderStrategy {
    Hardware,
    Software,
}

impl EncoderStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Software => "software",
        }
    }

    /// Strategies to try, in order. Software always comes last.
    pub fn plan(cfg: &EncoderConfig) -> Vec<Self> {
        let hw = cfg
            .hardware_codec
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if cfg.prefer_hardware && hw {
            vec![Self::Hardware, Self::Software]
        } else {
            vec![Self::Software]
        }
    }

    pub fn codec(self, cfg: &EncoderConfig) -> Option<VideoCodec> {
        let name = match self {
            Self::Hardware => cfg.hardware_codec.as_deref()?,
            Self::Software => cfg.software_codec.as_str(),
        };
        Some(VideoCodec {
            name: name.to_string(),
            preset: cfg.preset.preset_for(name).map(str::to_string),
        })
    }
}

impl std::fmt::Display for EncoderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoCodec {
    pub name: String,
    pub preset: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Plain,
    /// Repeat the input indefinitely; the job duration bounds the output.
    Loop,
    /// A concat-demuxer list file.
    ConcatList,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaInput {
    pub path: PathBuf,
    pub mode: InputMode,
}

impl MediaInput {
    pub fn plain(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: InputMode::Plain,
        }
    }

    pub fn looped(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: InputMode::Loop,
        }
    }

    pub fn concat_list(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: InputMode::ConcatList,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoFilter {
    /// Single-input chain (`-vf`).
    Chain(String),
    /// Multi-input graph (`-filter_complex`), outputs selected through `maps`.
    Graph(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoOutput {
    Copy,
    Encode {
        codec: VideoCodec,
        bitrate: String,
        fps: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioOutput {
    Copy,
    Aac {
        bitrate: String,
        sample_rate: u32,
        channels: u16,
    },
    Disabled,
}

impl AudioOutput {
    pub fn canonical(video: &VideoConfig) -> Self {
        Self::Aac {
            bitrate: video.audio_bitrate.clone(),
            sample_rate: video.audio_sample_rate,
            channels: video.audio_channels,
        }
    }
}

/// One encoder invocation, described independently of any particular encoder binary.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeJob {
    pub inputs: Vec<MediaInput>,
    pub filter: Option<VideoFilter>,
    pub maps: Vec<String>,
    pub video: VideoOutput,
    pub audio: AudioOutput,
    /// Output duration in seconds.
    pub duration: Option<f64>,
    pub out_path: PathBuf,
}

impl EncodeJob {
    /// Same job with the video codec swapped, for strategy fallback. Stream-copy jobs are
    /// returned unchanged.
    pub fn with_codec(&self, codec: VideoCodec) -> Self {
        let mut job = self.clone();
        if let VideoOutput::Encode { codec: c, .. } = &mut job.video {
            *c = codec;
        }
        job
    }

    pub fn with_out_path(&self, out_path: impl Into<PathBuf>) -> Self {
        let mut job = self.clone();
        job.out_path = out_path.into();
        job
    }
}

/// Why a single encode attempt failed.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum EncodeFailure {
    #[error("could not start encoder: {0}")]
    Spawn(String),

    #[error("encoder exited with {}: {stderr}", exit_label(*code))]
    Exit { code: Option<i32>, stderr: String },

    #[error("encoder timed out after {}s", after.as_secs())]
    TimedOut { after: Duration },

    #[error("could not finalize output '{}': {message}", path.display())]
    Output { path: PathBuf, message: String },
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

/// Sibling path the encoder writes to before the output is moved into place.
///
/// `scene_001_composite.mp4` becomes `scene_001_composite.partial.mp4`, keeping the extension so
/// the muxer is still inferred from it.
pub fn partial_path(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match out.extension() {
        Some(ext) => format!("{stem}.partial.{}", ext.to_string_lossy()),
        None => format!("{stem}.partial"),
    };
    out.with_file_name(name)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/job.rs"]
mod tests;
