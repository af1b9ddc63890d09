//! scenecut turns a marked-up narration script into a finished video.
//!
//! The pipeline is a sequence of stage functions over an ordered `Vec<Scene>`:
//!
//! - Parse the script into [`Scene`]s ([`parse_script`])
//! - Synthesize narration and accumulate the timeline ([`Synthesizer`], [`accumulate`])
//! - Resolve and render each scene's visual layers ([`AssetPaths`], [`LayerRenderer`])
//! - Composite every scene through an [`Encoder`], falling back from hardware to software
//! - Concatenate the composited scenes into one MP4 ([`assemble`])
//!
//! External programs (`ffmpeg`, `ffprobe`, TTS and renderers) sit behind traits so the whole
//! pipeline can be driven in-process by tests.
#![forbid(unsafe_code)]

/// Concat manifest and final assembly.
pub mod assemble;
/// Layer source naming, resolution, probing and rendering.
pub mod assets;
/// Scene composition filter graphs.
pub mod compose;
/// Encoder jobs, the `ffmpeg` encoder and strategy fallback.
pub mod encode;
pub mod foundation;
/// Narration synthesis.
pub mod narration;
/// Stage functions and run reports.
pub mod pipeline;
/// Scene model and the scene state file.
pub mod scene;
pub mod script;
/// Duration estimates, timeline offsets and captions.
pub mod timeline;

pub use crate::assemble::assembler::{AssemblyMode, AssemblySummary, assemble};
pub use crate::assets::paths::AssetPaths;
pub use crate::assets::render::{CommandRenderer, LayerRenderer};
pub use crate::assets::resolve::{LayerStack, Resolution, resolve_scene};
pub use crate::compose::compositor::{CompositeOutcome, composite_scene};
pub use crate::encode::ffmpeg::{Encoder, FfmpegEncoder};
pub use crate::encode::job::{EncodeFailure, EncodeJob, EncoderStrategy, QualityPreset};
pub use crate::encode::recording::RecordingEncoder;
pub use crate::foundation::config::{CommandSpec, PipelineConfig};
pub use crate::foundation::error::{ScenecutError, ScenecutResult};
pub use crate::narration::synth::{
    CommandSynthesizer, Narration, PrerecordedNarration, Synthesizer,
};
pub use crate::pipeline::context::PipelineContext;
pub use crate::pipeline::report::{RunSummary, StageOutput, StageReport};
pub use crate::scene::model::{AnchorPosition, LayerKind, Scene, SceneKind};
pub use crate::script::parser::parse_script;
pub use crate::timeline::accumulate::accumulate;
