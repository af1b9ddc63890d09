use super::*;
use crate::scene::model::LayerSources;

#[test]
fn bare_marker_has_no_params() {
    let m = parse_marker("[STOCK_ONLY]", 1).unwrap().unwrap();
    assert_eq!(m.marker_type, MarkerType::Current(SceneKind::StockOnly));
    assert!(m.params.is_empty());
}

#[test]
fn params_split_into_values_and_flags() {
    let m = parse_marker("[FULL_COMPOSITE | stock: a.mp4 | infographic:flow | muted]", 4)
        .unwrap()
        .unwrap();
    assert_eq!(
        m.params,
        vec![
            MarkerParam::Value {
                key: "stock".to_string(),
                value: "a.mp4".to_string()
            },
            MarkerParam::Value {
                key: "infographic".to_string(),
                value: "flow".to_string()
            },
            MarkerParam::Flag("muted".to_string()),
        ]
    );
}

#[test]
fn value_keeps_text_after_first_colon() {
    let m = parse_marker("[STOCK_ONLY | stock:clips/a:b.mp4]", 1)
        .unwrap()
        .unwrap();
    let visual = m.visual_requirements(1).unwrap();
    assert_eq!(visual.sources.stock_file(), Some("clips/a:b.mp4"));
}

#[test]
fn non_marker_lines_are_narration() {
    assert!(parse_marker("Hello world.", 1).unwrap().is_none());
    assert!(parse_marker("[pause for effect]", 1).unwrap().is_none());
    assert!(parse_marker("[]", 1).unwrap().is_none());
    assert!(parse_marker("[STOCK_ONLY", 1).unwrap().is_none());
}

#[test]
fn unknown_type_is_a_parse_error_with_line() {
    let err = parse_marker("[SPLIT_SCREEN | stock:a.mp4]", 7).unwrap_err();
    match err {
        ScenecutError::Parse { line, message } => {
            assert_eq!(line, 7);
            assert!(message.contains("SPLIT_SCREEN"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn legacy_types_normalize_but_remember_origin() {
    let m = parse_marker("[AVATAR_OVER_STOCK | stock:a.mp4]", 1)
        .unwrap()
        .unwrap();
    assert_eq!(m.marker_type.kind(), SceneKind::StockOnly);
    assert_eq!(m.marker_type.legacy(), Some(LegacyKind::AvatarOverStock));
}

#[test]
fn avatar_params_build_placement() {
    let m = parse_marker("[STOCK_ONLY | position:top-left | size:30%]", 2)
        .unwrap()
        .unwrap();
    let visual = m.visual_requirements(2).unwrap();
    assert!(visual.avatar.requested);
    assert_eq!(visual.avatar.position, Some(AnchorPosition::TopLeft));
    assert_eq!(visual.avatar.size_percent, Some(30));
}

#[test]
fn avatar_flag_requests_overlay_without_placement() {
    let m = parse_marker("[INFOGRAPHIC_ONLY | avatar]", 2).unwrap().unwrap();
    let visual = m.visual_requirements(2).unwrap();
    assert!(visual.avatar.requested);
    assert!(visual.flags.is_empty());
}

#[test]
fn bad_avatar_params_are_parse_errors() {
    let m = parse_marker("[STOCK_ONLY | position:middle]", 5)
        .unwrap()
        .unwrap();
    assert!(m.visual_requirements(5).is_err());

    let m = parse_marker("[STOCK_ONLY | size:250%]", 5).unwrap().unwrap();
    assert!(m.visual_requirements(5).is_err());

    assert!(parse_marker("[STOCK_ONLY | stock:]", 5).is_err());
}

#[test]
fn foreign_keys_are_ignored_for_the_type() {
    let m = parse_marker("[INFOGRAPHIC_ONLY | stock:a.mp4 | infographic:flow | mood:calm]", 1)
        .unwrap()
        .unwrap();
    let visual = m.visual_requirements(1).unwrap();
    assert_eq!(
        visual.sources,
        LayerSources::InfographicOnly {
            infographic_id: Some("flow".to_string())
        }
    );
}
