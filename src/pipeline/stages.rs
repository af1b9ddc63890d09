use std::path::Path;

use anyhow::Context as _;
use tracing::{info, warn};

use crate::assemble::assembler::assemble;
use crate::assets::render::LayerRenderer;
use crate::assets::resolve::expected_layer_path;
use crate::compose::compositor::{CompositeOutcome, composite_scene};
use crate::encode::ffmpeg::Encoder;
use crate::foundation::error::{ScenecutError, ScenecutResult};
use crate::narration::synth::Synthesizer;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::report::{RunSummary, Stage, StageOutput, StageReport};
use crate::scene::model::Scene;
use crate::script::parser::parse_script;
use crate::timeline::accumulate::accumulate;
use crate::timeline::captions::render_srt;

/// Record a scene-local failure in `report`; anything else aborts the stage.
fn absorb(report: &mut StageReport, scene_id: u32, err: ScenecutError) -> ScenecutResult<()> {
    if !err.is_scene_local() {
        return Err(err);
    }
    warn!(stage = %report.stage, scene_id, error = %err, "scene skipped");
    report.skip(scene_id, err.to_string());
    Ok(())
}

fn finish(
    ctx: &PipelineContext,
    scenes: Vec<Scene>,
    report: StageReport,
) -> ScenecutResult<StageOutput> {
    ctx.save_state(&scenes)?;
    info!(state = %ctx.state_path().display(), "{report}");
    Ok(StageOutput { scenes, report })
}

/// Parse a marked-up script into scenes with estimated durations.
#[tracing::instrument(skip_all)]
pub fn parse_stage(ctx: &PipelineContext, script: &str) -> ScenecutResult<StageOutput> {
    let scenes = parse_script(script, ctx.config.timing.words_per_minute)?;
    let mut report = StageReport::new(Stage::Parse);
    report.processed = scenes.len();
    finish(ctx, scenes, report)
}

/// Synthesize narration for every scene, then recompute the timeline from measured durations.
///
/// Scenes whose audio file is already recorded in the state and still on disk are kept as is.
/// A failed synthesis leaves the scene without audio, which excludes it from the timeline.
#[tracing::instrument(skip_all, fields(scenes = scenes.len()))]
pub fn narrate_stage(
    ctx: &PipelineContext,
    mut scenes: Vec<Scene>,
    synth: &mut dyn Synthesizer,
) -> ScenecutResult<StageOutput> {
    let mut report = StageReport::new(Stage::Narrate);
    for scene in &mut scenes {
        if scene.has_audio() && scene.audio_file.as_ref().is_some_and(|p| p.is_file()) {
            report.reused += 1;
            continue;
        }
        match synth.synthesize(scene.id, &scene.narration_text) {
            Ok(n) => {
                info!(scene_id = scene.id, duration = n.duration_sec, "narration ready");
                scene.audio_file = Some(n.audio_file);
                scene.audio_duration = Some(n.duration_sec);
                report.processed += 1;
            }
            Err(e) => {
                scene.clear_audio();
                absorb(&mut report, scene.id, e)?;
            }
        }
    }

    let totals = accumulate(&mut scenes);
    info!(
        included = totals.included,
        excluded = totals.excluded,
        total = totals.total_duration,
        "timeline accumulated"
    );
    finish(ctx, scenes, report)
}

/// Run the configured layer renderers for layers that are not on disk yet.
///
/// Scenes that already have a composite need no layers and are left alone. A rendered avatar
/// is recorded in the scene's `avatar_video`.
#[tracing::instrument(skip_all, fields(scenes = scenes.len()))]
pub fn render_layers_stage(
    ctx: &PipelineContext,
    mut scenes: Vec<Scene>,
    renderers: &mut [Box<dyn LayerRenderer>],
) -> ScenecutResult<StageOutput> {
    let mut report = StageReport::new(Stage::RenderLayers);
    for scene in &mut scenes {
        if ctx.paths.composited(scene.id).is_file() {
            report.reused += 1;
            continue;
        }
        for layer in scene.required_layers() {
            let Some(renderer) = renderers.iter_mut().find(|r| r.layer() == layer) else {
                continue;
            };
            let out = expected_layer_path(scene, layer, &ctx.paths);
            if out.is_file() {
                report.reused += 1;
            } else if let Err(e) = renderer.render(scene, &out) {
                absorb(&mut report, scene.id, e)?;
                continue;
            } else {
                report.processed += 1;
            }
            if layer == crate::scene::model::LayerKind::Avatar {
                scene.avatar_video = Some(out);
            }
        }
    }
    finish(ctx, scenes, report)
}

/// Composite every narrated scene. Failures skip the scene and clear its `video_file`.
#[tracing::instrument(skip_all, fields(scenes = scenes.len()))]
pub fn compose_stage(
    ctx: &PipelineContext,
    mut scenes: Vec<Scene>,
    encoder: &mut dyn Encoder,
) -> ScenecutResult<StageOutput> {
    let mut report = StageReport::new(Stage::Compose);
    for scene in &mut scenes {
        if !scene.has_audio() {
            report.skip(scene.id, "no narration audio");
            continue;
        }
        match composite_scene(encoder, scene, &ctx.paths, &ctx.config) {
            Ok(CompositeOutcome::Reused(path)) => {
                report.reused += 1;
                // A file this run did not write keeps the codec recorded when it was encoded.
                if scene.video_file.as_ref() != Some(&path) {
                    scene.video_codec = None;
                }
                scene.video_file = Some(path);
            }
            Ok(CompositeOutcome::Encoded { path, codec, .. }) => {
                report.processed += 1;
                scene.video_file = Some(path);
                scene.video_codec = Some(codec);
            }
            Err(e) => {
                scene.video_file = None;
                scene.video_codec = None;
                absorb(&mut report, scene.id, e)?;
            }
        }
    }
    finish(ctx, scenes, report)
}

/// Concatenate the composited scenes into `output`.
#[tracing::instrument(skip_all, fields(output = %output.display()))]
pub fn assemble_stage(
    ctx: &PipelineContext,
    scenes: &[Scene],
    encoder: &mut dyn Encoder,
    output: &Path,
) -> ScenecutResult<RunSummary> {
    let summary = assemble(encoder, scenes, &ctx.paths, &ctx.config, output)?;
    info!(
        output = %summary.output.display(),
        mode = ?summary.mode,
        included = summary.included,
        skipped = summary.skipped.len(),
        duration = summary.total_duration,
        "assembled"
    );
    Ok(RunSummary {
        output: summary.output,
        processed: summary.included,
        skipped: summary.skipped.len(),
        total_duration: summary.total_duration,
    })
}

/// Write an SRT caption track for the accumulated timeline.
pub fn write_captions(path: &Path, scenes: &[Scene]) -> ScenecutResult<()> {
    crate::encode::ffmpeg::ensure_parent_dir(path)?;
    std::fs::write(path, render_srt(scenes))
        .with_context(|| format!("write captions '{}'", path.display()))?;
    Ok(())
}

/// External capabilities a full run needs.
pub struct Tooling<'a> {
    pub synthesizer: &'a mut dyn Synthesizer,
    pub renderers: &'a mut [Box<dyn LayerRenderer>],
    pub encoder: &'a mut dyn Encoder,
}

/// Script to finished video: every stage in order, captions written next to `output`.
#[tracing::instrument(skip_all, fields(output = %output.display()))]
pub fn run_all(
    ctx: &PipelineContext,
    script: &str,
    tools: Tooling<'_>,
    output: &Path,
) -> ScenecutResult<RunSummary> {
    let parsed = parse_stage(ctx, script)?;
    let narrated = narrate_stage(ctx, parsed.scenes, tools.synthesizer)?;
    let rendered = render_layers_stage(ctx, narrated.scenes, tools.renderers)?;
    let composed = compose_stage(ctx, rendered.scenes, &mut *tools.encoder)?;
    let summary = assemble_stage(ctx, &composed.scenes, tools.encoder, output)?;
    write_captions(&output.with_extension("srt"), &composed.scenes)?;
    Ok(summary)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/stages.rs"]
mod tests;
