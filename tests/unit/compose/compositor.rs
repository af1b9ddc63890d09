use std::path::Path;

use super::*;
use crate::encode::job::InputMode;
use crate::encode::recording::RecordingEncoder;
use crate::foundation::config::PathsConfig;
use crate::scene::model::{LayerKind, SceneKind, VisualRequirements};

fn setup(name: &str) -> (AssetPaths, PipelineConfig) {
    let root = PathBuf::from("target/unit_compose_compositor").join(name);
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();
    let cfg = PipelineConfig {
        paths: PathsConfig {
            root,
            ..PathsConfig::default()
        },
        ..PipelineConfig::default()
    };
    (AssetPaths::from_config(&cfg.paths), cfg)
}

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"x").unwrap();
}

fn narrated(id: u32, kind: SceneKind, duration: f64) -> Scene {
    let mut s = Scene::new(id, VisualRequirements::new(kind), "Narration.");
    s.audio_file = Some(PathBuf::from(format!("voice/scene_{id:03}.wav")));
    s.audio_duration = Some(duration);
    s
}

#[test]
fn encodes_to_canonical_path_bounded_by_narration() {
    let (paths, cfg) = setup("encode");
    let scene = narrated(1, SceneKind::StockOnly, 2.5);
    touch(&paths.layer_source(1, LayerKind::Stock, None));

    let mut enc = RecordingEncoder::new();
    let outcome = composite_scene(&mut enc, &scene, &paths, &cfg).unwrap();
    assert_eq!(
        outcome,
        CompositeOutcome::Encoded {
            path: paths.composited(1),
            strategy: EncoderStrategy::Hardware,
            codec: "h264_nvenc".to_string(),
        }
    );
    assert!(paths.composited(1).is_file());

    let job = &enc.jobs()[0];
    assert_eq!(job.duration, Some(2.5));
    assert_eq!(job.inputs[0].mode, InputMode::Loop);
    assert_eq!(job.inputs[1].path, PathBuf::from("voice/scene_001.wav"));
    assert_eq!(job.audio, AudioOutput::canonical(&cfg.video));
}

#[test]
fn second_run_reuses_existing_composite() {
    let (paths, cfg) = setup("reuse");
    let scene = narrated(1, SceneKind::StockOnly, 2.0);
    touch(&paths.layer_source(1, LayerKind::Stock, None));

    let mut enc = RecordingEncoder::new();
    composite_scene(&mut enc, &scene, &paths, &cfg).unwrap();
    let again = composite_scene(&mut enc, &scene, &paths, &cfg).unwrap();
    assert_eq!(again, CompositeOutcome::Reused(paths.composited(1)));
    assert_eq!(enc.jobs().len(), 1);
}

#[test]
fn scene_without_audio_is_rejected_before_resolution() {
    let (paths, cfg) = setup("no_audio");
    let scene = Scene::new(3, VisualRequirements::new(SceneKind::StockOnly), "Text.");
    let mut enc = RecordingEncoder::new();
    let err = composite_scene(&mut enc, &scene, &paths, &cfg).unwrap_err();
    assert!(matches!(err, ScenecutError::Composition { scene_id: 3, .. }));
    assert!(enc.jobs().is_empty());
}

#[test]
fn missing_layer_propagates_missing_asset() {
    let (paths, cfg) = setup("missing");
    let scene = narrated(2, SceneKind::InfographicOnly, 1.0);
    let mut enc = RecordingEncoder::new();
    let err = composite_scene(&mut enc, &scene, &paths, &cfg).unwrap_err();
    assert!(matches!(
        err,
        ScenecutError::MissingAsset {
            scene_id: 2,
            layer: LayerKind::Infographic,
            ..
        }
    ));
}

#[test]
fn both_strategies_failing_is_a_composition_error_without_output() {
    let (paths, cfg) = setup("all_fail");
    let scene = narrated(1, SceneKind::StockOnly, 1.0);
    touch(&paths.layer_source(1, LayerKind::Stock, None));

    let mut enc = RecordingEncoder::new()
        .failing_codec("h264_nvenc")
        .failing_codec("libx264");
    let err = composite_scene(&mut enc, &scene, &paths, &cfg).unwrap_err();
    assert!(matches!(err, ScenecutError::Composition { scene_id: 1, .. }));
    assert!(err.to_string().contains("software (libx264)"));
    assert!(!paths.composited(1).exists());
}

#[test]
fn software_fallback_reports_software_codec() {
    let (paths, cfg) = setup("fallback_codec");
    let scene = narrated(1, SceneKind::StockOnly, 1.0);
    touch(&paths.layer_source(1, LayerKind::Stock, None));

    let mut enc = RecordingEncoder::new().failing_codec("h264_nvenc");
    let outcome = composite_scene(&mut enc, &scene, &paths, &cfg).unwrap();
    assert!(matches!(
        outcome,
        CompositeOutcome::Encoded {
            strategy: EncoderStrategy::Software,
            ref codec,
            ..
        } if codec == "libx264"
    ));
}
