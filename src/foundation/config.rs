use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::encode::job::QualityPreset;
use crate::foundation::error::{ScenecutError, ScenecutResult};
use crate::scene::model::LayerKind;

/// Allowed range for the avatar overlay margin, in pixels.
pub const MARGIN_RANGE_PX: std::ops::RangeInclusive<u32> = 10..=20;

/// Full pipeline configuration.
///
/// Every section is `#[serde(default)]`, so a config file only needs the fields it overrides.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub video: VideoConfig,
    pub encoder: EncoderConfig,
    pub overlay: OverlayConfig,
    pub timing: TimingConfig,
    pub process: ProcessConfig,
    pub tools: ToolsConfig,
}

/// Asset directories. Relative directories are resolved against `root`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub root: PathBuf,
    pub stock_dir: PathBuf,
    pub infographic_dir: PathBuf,
    pub avatar_dir: PathBuf,
    pub composited_dir: PathBuf,
    pub audio_dir: PathBuf,
    /// Scratch space for concat manifests.
    pub work_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            stock_dir: PathBuf::from("stock_video/processed"),
            infographic_dir: PathBuf::from("video/scenes/infographic_scenes"),
            avatar_dir: PathBuf::from("avatar/renders/talking_head_segments"),
            composited_dir: PathBuf::from("video/scenes/composited_scenes"),
            audio_dir: PathBuf::from("voice/tts_output"),
            work_dir: PathBuf::from("video"),
        }
    }
}

/// Canonical output format every composited scene is encoded to.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub video_bitrate: String,
    pub audio_bitrate: String,
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30,
            video_bitrate: "8M".to_string(),
            audio_bitrate: "192k".to_string(),
            audio_sample_rate: 48_000,
            audio_channels: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// Hardware codec name, e.g. `h264_nvenc`. `None` disables the hardware attempt.
    pub hardware_codec: Option<String>,
    pub software_codec: String,
    pub preset: QualityPreset,
    pub prefer_hardware: bool,
    pub ffmpeg_bin: PathBuf,
    pub ffprobe_bin: PathBuf,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            hardware_codec: Some("h264_nvenc".to_string()),
            software_codec: "libx264".to_string(),
            preset: QualityPreset::Balanced,
            prefer_hardware: true,
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            ffprobe_bin: PathBuf::from("ffprobe"),
        }
    }
}

/// Avatar overlay sizing, as a percentage of frame width.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    pub two_layer_scale_percent: u32,
    pub three_layer_scale_percent: u32,
    pub margin_px: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            two_layer_scale_percent: 25,
            three_layer_scale_percent: 15,
            margin_px: 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub words_per_minute: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: crate::timeline::estimate::DEFAULT_WORDS_PER_MINUTE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessConfig {
    /// Upper bound for any single external process (encoder, synthesizer, renderer).
    pub timeout_secs: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self { timeout_secs: 600 }
    }
}

impl ProcessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// An external program plus its argument template.
///
/// Arguments may contain `{scene_id}`, `{out}` and `{audio}` placeholders.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a [`std::process::Command`], replacing `{name}` placeholders in the arguments.
    pub fn command(&self, vars: &[(&str, &str)]) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        for arg in &self.args {
            let mut expanded = arg.clone();
            for (name, value) in vars {
                expanded = expanded.replace(&format!("{{{name}}}"), value);
            }
            cmd.arg(expanded);
        }
        cmd
    }

    /// `true` if any argument mentions `{name}`.
    pub fn uses(&self, name: &str) -> bool {
        let needle = format!("{{{name}}}");
        self.args.iter().any(|a| a.contains(&needle))
    }
}

/// External tools for narration and layer rendering. Unset tools are simply not run.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Text-to-speech program; narration is written to its stdin.
    pub synthesizer: Option<CommandSpec>,
    pub stock_renderer: Option<CommandSpec>,
    pub infographic_renderer: Option<CommandSpec>,
    pub avatar_renderer: Option<CommandSpec>,
}

impl ToolsConfig {
    pub fn renderer(&self, layer: LayerKind) -> Option<&CommandSpec> {
        match layer {
            LayerKind::Stock => self.stock_renderer.as_ref(),
            LayerKind::Infographic => self.infographic_renderer.as_ref(),
            LayerKind::Avatar => self.avatar_renderer.as_ref(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> ScenecutResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&raw).map_err(|e| {
            ScenecutError::serde(format!("config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> ScenecutResult<()> {
        let v = &self.video;
        if v.width == 0 || v.height == 0 {
            return Err(ScenecutError::validation(
                "video width/height must be non-zero",
            ));
        }
        if !v.width.is_multiple_of(2) || !v.height.is_multiple_of(2) {
            // yuv420p output needs even dimensions.
            return Err(ScenecutError::validation(
                "video width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if v.fps == 0 {
            return Err(ScenecutError::validation("video fps must be non-zero"));
        }
        if v.audio_sample_rate == 0 || v.audio_channels == 0 {
            return Err(ScenecutError::validation(
                "audio sample rate and channel count must be non-zero",
            ));
        }

        let o = &self.overlay;
        for (name, pct) in [
            ("two_layer_scale_percent", o.two_layer_scale_percent),
            ("three_layer_scale_percent", o.three_layer_scale_percent),
        ] {
            if pct == 0 || pct > 100 {
                return Err(ScenecutError::validation(format!(
                    "overlay {name} must be in 1..=100, got {pct}"
                )));
            }
        }
        if !MARGIN_RANGE_PX.contains(&o.margin_px) {
            return Err(ScenecutError::validation(format!(
                "overlay margin_px must be in {}..={}, got {}",
                MARGIN_RANGE_PX.start(),
                MARGIN_RANGE_PX.end(),
                o.margin_px
            )));
        }

        if self.timing.words_per_minute == 0 {
            return Err(ScenecutError::validation(
                "timing words_per_minute must be non-zero",
            ));
        }
        if self.process.timeout_secs == 0 {
            return Err(ScenecutError::validation(
                "process timeout_secs must be non-zero",
            ));
        }
        if self.encoder.software_codec.trim().is_empty() {
            return Err(ScenecutError::validation(
                "encoder software_codec must be set",
            ));
        }
        let tools = &self.tools;
        for (name, spec) in [
            ("synthesizer", &tools.synthesizer),
            ("stock_renderer", &tools.stock_renderer),
            ("infographic_renderer", &tools.infographic_renderer),
            ("avatar_renderer", &tools.avatar_renderer),
        ] {
            if let Some(spec) = spec
                && spec.program.trim().is_empty()
            {
                return Err(ScenecutError::validation(format!(
                    "tools {name} program must not be empty"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
