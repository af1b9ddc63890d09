use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ScenecutError::parse(3, "x")
            .to_string()
            .contains("parse error (line 3):")
    );
    assert!(
        ScenecutError::composition(2, "x")
            .to_string()
            .contains("composition error (scene 2):")
    );
    assert!(
        ScenecutError::assembly("x")
            .to_string()
            .contains("assembly error:")
    );
    assert!(
        ScenecutError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ScenecutError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn missing_asset_names_layer_and_scene() {
    let err = ScenecutError::MissingAsset {
        scene_id: 2,
        layer: LayerKind::Stock,
        path: PathBuf::from("stock/b.mp4"),
    };
    let msg = err.to_string();
    assert!(msg.contains("scene 2"));
    assert!(msg.contains("stock"));
    assert!(msg.contains("stock/b.mp4"));
}

#[test]
fn scene_local_classification() {
    assert!(ScenecutError::composition(1, "x").is_scene_local());
    assert!(ScenecutError::narration(1, "x").is_scene_local());
    assert!(ScenecutError::render(1, LayerKind::Avatar, "x").is_scene_local());
    assert!(!ScenecutError::parse(1, "x").is_scene_local());
    assert!(!ScenecutError::assembly("x").is_scene_local());
    assert!(!ScenecutError::validation("x").is_scene_local());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ScenecutError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
