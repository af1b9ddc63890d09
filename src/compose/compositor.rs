use std::path::{Path, PathBuf};

use tracing::info;

use crate::assets::paths::AssetPaths;
use crate::assets::resolve::{Resolution, resolve_scene};
use crate::compose::graph::plan_composition;
use crate::encode::fallback::{describe_attempts, encode_with_fallback};
use crate::encode::ffmpeg::Encoder;
use crate::encode::job::{AudioOutput, EncodeJob, EncoderStrategy, VideoOutput};
use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{ScenecutError, ScenecutResult};
use crate::scene::model::Scene;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompositeOutcome {
    /// An existing composite was reused; nothing was encoded.
    Reused(PathBuf),
    Encoded {
        path: PathBuf,
        strategy: EncoderStrategy,
        /// Video codec the successful attempt used.
        codec: String,
    },
}

impl CompositeOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Reused(p) | Self::Encoded { path: p, .. } => p.as_path(),
        }
    }
}

/// Produce the composited file for one scene.
///
/// Scenes need measured narration audio first. Resolution may short-circuit to an existing
/// composite; otherwise the layer stack is encoded to the canonical format at
/// `composited_dir/scene_{id:03}_composite.mp4`, trying each encoder strategy in turn.
pub fn composite_scene(
    encoder: &mut dyn Encoder,
    scene: &Scene,
    paths: &AssetPaths,
    cfg: &PipelineConfig,
) -> ScenecutResult<CompositeOutcome> {
    let (Some(audio), Some(duration)) = (scene.audio_file.as_ref(), scene.audio_duration) else {
        return Err(ScenecutError::composition(
            scene.id,
            "scene has no narration audio",
        ));
    };

    let stack = match resolve_scene(scene, paths)? {
        Resolution::Precomposited(p) => return Ok(CompositeOutcome::Reused(p)),
        Resolution::Layers(stack) => stack,
    };

    let plan = plan_composition(scene, &stack, audio, duration, &cfg.video, &cfg.overlay)?;
    let out_path = paths.composited(scene.id);
    let software = EncoderStrategy::Software
        .codec(&cfg.encoder)
        .ok_or_else(|| ScenecutError::validation("no software codec configured"))?;
    let job = EncodeJob {
        inputs: plan.inputs,
        filter: Some(plan.filter),
        maps: plan.maps,
        video: VideoOutput::Encode {
            codec: software,
            bitrate: cfg.video.video_bitrate.clone(),
            fps: cfg.video.fps,
        },
        audio: AudioOutput::canonical(&cfg.video),
        duration: Some(duration),
        out_path: out_path.clone(),
    };

    info!(
        scene_id = scene.id,
        layers = stack.len(),
        kind = %scene.kind(),
        "compositing scene"
    );
    match encode_with_fallback(encoder, &job, &cfg.encoder) {
        Ok(strategy) => Ok(CompositeOutcome::Encoded {
            path: out_path,
            strategy,
            codec: strategy
                .codec(&cfg.encoder)
                .map(|c| c.name)
                .unwrap_or_default(),
        }),
        Err(attempts) => Err(ScenecutError::composition(
            scene.id,
            describe_attempts(&attempts),
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
