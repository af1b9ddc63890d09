use std::path::PathBuf;

use super::*;
use crate::foundation::config::{PathsConfig, PipelineConfig};
use crate::narration::synth::Narration;
use crate::scene::model::LayerKind;

fn ctx(name: &str) -> PipelineContext {
    let root = PathBuf::from("target/unit_pipeline_stages").join(name);
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();
    let cfg = PipelineConfig {
        paths: PathsConfig {
            root,
            ..PathsConfig::default()
        },
        ..PipelineConfig::default()
    };
    PipelineContext::new(cfg, None).unwrap()
}

/// Synthesizer that fails for chosen ids and otherwise reports two seconds per scene.
struct FixedSynth {
    fail: Vec<u32>,
    calls: Vec<u32>,
}

impl Synthesizer for FixedSynth {
    fn synthesize(&mut self, scene_id: u32, _text: &str) -> ScenecutResult<Narration> {
        self.calls.push(scene_id);
        if self.fail.contains(&scene_id) {
            return Err(ScenecutError::narration(scene_id, "tts crashed"));
        }
        Ok(Narration {
            audio_file: PathBuf::from(format!("scene_{scene_id:03}.wav")),
            duration_sec: 2.0,
        })
    }
}

struct TouchRenderer {
    layer: LayerKind,
    rendered: Vec<u32>,
}

impl LayerRenderer for TouchRenderer {
    fn layer(&self) -> LayerKind {
        self.layer
    }

    fn render(&mut self, scene: &Scene, out_path: &Path) -> ScenecutResult<()> {
        self.rendered.push(scene.id);
        std::fs::create_dir_all(out_path.parent().unwrap())?;
        std::fs::write(out_path, b"layer")?;
        Ok(())
    }
}

const SCRIPT: &str = "[STOCK_ONLY]\nOne.\n[STOCK_ONLY | avatar]\nTwo.\n[STOCK_ONLY]\nThree.";

#[test]
fn parse_stage_writes_state() {
    let ctx = ctx("parse");
    let out = parse_stage(&ctx, SCRIPT).unwrap();
    assert_eq!(out.scenes.len(), 3);
    assert_eq!(out.report.processed, 3);
    assert_eq!(ctx.load_state().unwrap(), out.scenes);
}

#[test]
fn parse_errors_abort() {
    let ctx = ctx("parse_error");
    let err = parse_stage(&ctx, "[NOPE]\ntext").unwrap_err();
    assert!(matches!(err, ScenecutError::Parse { line: 1, .. }));
    assert!(!ctx.state_path().exists());
}

#[test]
fn narration_failure_excludes_scene_from_timeline() {
    let ctx = ctx("narrate");
    let parsed = parse_stage(&ctx, SCRIPT).unwrap();
    let mut synth = FixedSynth {
        fail: vec![2],
        calls: Vec::new(),
    };
    let out = narrate_stage(&ctx, parsed.scenes, &mut synth).unwrap();

    assert_eq!(out.report.processed, 2);
    assert_eq!(out.report.skipped.len(), 1);
    assert_eq!(out.report.skipped[0].scene_id, 2);
    assert_eq!(out.scenes[0].start_time, Some(0.0));
    assert_eq!(out.scenes[1].start_time, None);
    assert_eq!(out.scenes[2].start_time, Some(2.0));
    assert_eq!(out.scenes[2].end_time, Some(4.0));
}

#[test]
fn renderers_fill_missing_layers_once() {
    let ctx = ctx("render");
    let parsed = parse_stage(&ctx, SCRIPT).unwrap();
    let mut renderers: Vec<Box<dyn LayerRenderer>> = vec![Box::new(TouchRenderer {
        layer: LayerKind::Avatar,
        rendered: Vec::new(),
    })];

    let first = render_layers_stage(&ctx, parsed.scenes, &mut renderers).unwrap();
    assert_eq!(first.report.processed, 1);
    assert_eq!(
        first.scenes[1].avatar_video,
        Some(ctx.paths.layer_source(2, LayerKind::Avatar, None))
    );
    assert_eq!(first.scenes[0].avatar_video, None);

    let second = render_layers_stage(&ctx, first.scenes, &mut renderers).unwrap();
    assert_eq!(second.report.processed, 0);
    assert_eq!(second.report.reused, 1);
}

#[test]
fn compose_skips_unnarrated_scenes() {
    let ctx = ctx("compose");
    let parsed = parse_stage(&ctx, SCRIPT).unwrap();
    let mut enc = crate::encode::recording::RecordingEncoder::new();
    let out = compose_stage(&ctx, parsed.scenes, &mut enc).unwrap();
    assert_eq!(out.report.skipped.len(), 3);
    assert!(enc.jobs().is_empty());
}
