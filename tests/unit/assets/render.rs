use std::path::PathBuf;

use super::*;
use crate::scene::model::{SceneKind, VisualRequirements};

fn scene() -> Scene {
    Scene::new(5, VisualRequirements::new(SceneKind::StockOnly), "Hello.")
}

#[test]
fn audio_placeholder_requires_audio() {
    let spec = CommandSpec::new("sadtalker", ["--audio", "{audio}", "--out", "{out}"]);
    let mut r = CommandRenderer::new(LayerKind::Avatar, spec, Duration::from_secs(5));
    let err = r
        .render(&scene(), Path::new("target/unit_assets_render/never.mp4"))
        .unwrap_err();
    assert!(matches!(
        err,
        ScenecutError::Render {
            scene_id: 5,
            layer: LayerKind::Avatar,
            ..
        }
    ));
}

#[cfg(unix)]
#[test]
fn renders_through_placeholders() {
    let out = PathBuf::from("target/unit_assets_render/scene_5.mp4");
    let _ = std::fs::remove_file(&out);
    let spec = CommandSpec::new("sh", ["-c", "printf %s {scene_id} > {out}"]);
    let mut r = CommandRenderer::new(LayerKind::Stock, spec, Duration::from_secs(10));
    r.render(&scene(), &out).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "5");
}

#[cfg(unix)]
#[test]
fn silent_success_without_output_is_an_error() {
    let out = PathBuf::from("target/unit_assets_render/absent.mp4");
    let _ = std::fs::remove_file(&out);
    let spec = CommandSpec::new("true", Vec::<String>::new());
    let mut r = CommandRenderer::new(LayerKind::Infographic, spec, Duration::from_secs(10));
    let err = r.render(&scene(), &out).unwrap_err();
    assert!(err.to_string().contains("did not write"));
}

#[cfg(unix)]
#[test]
fn failing_program_reports_stderr() {
    let spec = CommandSpec::new("sh", ["-c", "echo boom >&2; exit 2"]);
    let mut r = CommandRenderer::new(LayerKind::Stock, spec, Duration::from_secs(10));
    let err = r
        .render(&scene(), Path::new("target/unit_assets_render/fail.mp4"))
        .unwrap_err();
    assert!(err.to_string().contains("boom"));
}
