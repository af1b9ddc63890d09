use super::*;

fn full_composite_scene() -> Scene {
    let mut visual = VisualRequirements::new(SceneKind::FullComposite);
    *visual.sources.stock_slot().unwrap() = Some("office.mp4".to_string());
    *visual.sources.infographic_slot().unwrap() = Some("flow".to_string());
    visual.avatar = AvatarPlacement {
        requested: true,
        position: Some(AnchorPosition::TopLeft),
        size_percent: Some(20),
    };
    visual.layout = Some("split".to_string());
    let mut scene = Scene::new(3, visual, "Every click counts.");
    scene.duration_estimate = 1.2;
    scene.audio_file = Some(PathBuf::from("voice/scene_003.wav"));
    scene.audio_duration = Some(2.5);
    scene.video_codec = Some("libx264".to_string());
    scene
}

#[test]
fn state_record_uses_flat_field_names() {
    let json = serde_json::to_value(full_composite_scene()).unwrap();
    assert_eq!(json["scene_id"], 3);
    assert_eq!(json["type"], "FULL_COMPOSITE");
    assert_eq!(json["visual_requirements"]["stock_file"], "office.mp4");
    assert_eq!(json["visual_requirements"]["infographic_id"], "flow");
    assert_eq!(json["visual_requirements"]["avatar_position"], "top-left");
    assert_eq!(json["visual_requirements"]["avatar_size"], 20);
    assert_eq!(json["audio_duration"], 2.5);
    assert_eq!(json["video_codec"], "libx264");
    assert!(json.get("start_time").is_none());
    assert!(json.get("original_type").is_none());

    let back: Scene = serde_json::from_value(json).unwrap();
    assert_eq!(back, full_composite_scene());
}

#[test]
fn record_rejects_fields_foreign_to_the_type() {
    let raw = r#"{
        "scene_id": 1,
        "type": "INFOGRAPHIC_ONLY",
        "narration_text": "x",
        "visual_requirements": { "stock_file": "a.mp4" }
    }"#;
    let err = serde_json::from_str::<Scene>(raw).unwrap_err();
    assert!(err.to_string().contains("stock_file is not valid"));
}

#[test]
fn record_rejects_zero_id_and_bad_durations() {
    let zero = r#"{ "scene_id": 0, "type": "STOCK_ONLY", "narration_text": "x" }"#;
    assert!(serde_json::from_str::<Scene>(zero).is_err());

    let negative = r#"{
        "scene_id": 1, "type": "STOCK_ONLY", "narration_text": "x", "audio_duration": -1.0
    }"#;
    assert!(serde_json::from_str::<Scene>(negative).is_err());
}

#[test]
fn required_layers_follow_kind_and_avatar() {
    let mut scene = Scene::new(1, VisualRequirements::new(SceneKind::StockOnly), "hi");
    assert_eq!(scene.required_layers(), vec![LayerKind::Stock]);

    scene.avatar_video = Some(PathBuf::from("avatar.mp4"));
    assert_eq!(
        scene.required_layers(),
        vec![LayerKind::Stock, LayerKind::Avatar]
    );

    let full = full_composite_scene();
    assert_eq!(
        full.required_layers(),
        vec![LayerKind::Stock, LayerKind::Infographic, LayerKind::Avatar]
    );
}

#[test]
fn anchor_parse_accepts_common_spellings() {
    assert_eq!(
        AnchorPosition::parse("bottom-left"),
        Some(AnchorPosition::BottomLeft)
    );
    assert_eq!(
        AnchorPosition::parse("TOP_RIGHT"),
        Some(AnchorPosition::TopRight)
    );
    assert_eq!(
        AnchorPosition::parse(" Center "),
        Some(AnchorPosition::Center)
    );
    assert_eq!(AnchorPosition::parse("middle"), None);
}

#[test]
fn legacy_kinds_normalize_to_stock_only() {
    assert_eq!(LegacyKind::AvatarOnly.normalized(), SceneKind::StockOnly);
    assert_eq!(LegacyKind::AvatarOverStock.normalized(), SceneKind::StockOnly);
}
