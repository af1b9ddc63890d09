use std::path::PathBuf;

use super::*;
use crate::scene::model::{SceneKind, VisualRequirements};

fn scene(id: u32, duration: Option<f64>) -> Scene {
    let mut s = Scene::new(id, VisualRequirements::new(SceneKind::StockOnly), "words");
    if let Some(d) = duration {
        s.audio_file = Some(PathBuf::from(format!("scene_{id:03}.wav")));
        s.audio_duration = Some(d);
    }
    s
}

#[test]
fn offsets_are_a_prefix_sum() {
    let mut scenes = vec![scene(1, Some(2.0)), scene(2, Some(3.0))];
    let totals = accumulate(&mut scenes);

    assert_eq!(scenes[0].start_time, Some(0.0));
    assert_eq!(scenes[0].end_time, Some(2.0));
    assert_eq!(scenes[1].start_time, Some(2.0));
    assert_eq!(scenes[1].end_time, Some(5.0));
    assert_eq!(totals.included, 2);
    assert!((totals.total_duration - 5.0).abs() < 1e-9);
}

#[test]
fn scenes_without_audio_leave_no_gap() {
    let mut scenes = vec![
        scene(1, Some(1.25)),
        scene(2, None),
        scene(3, Some(0.75)),
        scene(4, Some(4.1)),
    ];
    scenes[1].start_time = Some(99.0);
    scenes[1].end_time = Some(100.0);

    let totals = accumulate(&mut scenes);
    assert_eq!(totals.excluded, 1);
    assert_eq!(scenes[1].start_time, None);
    assert_eq!(scenes[1].end_time, None);
    assert_eq!(scenes[2].start_time, scenes[0].end_time);

    let timed: Vec<&Scene> = scenes.iter().filter(|s| s.has_audio()).collect();
    assert_eq!(timed[0].start_time, Some(0.0));
    for pair in timed.windows(2) {
        assert_eq!(pair[1].start_time, pair[0].end_time);
    }
    for s in &timed {
        let span = s.end_time.unwrap() - s.start_time.unwrap();
        assert!((span - s.audio_duration.unwrap()).abs() < 1e-9);
    }
}

#[test]
fn duration_without_audio_file_is_not_timed() {
    let mut s = scene(1, None);
    s.audio_duration = Some(3.0);
    let mut scenes = vec![s];
    let totals = accumulate(&mut scenes);
    assert_eq!(totals.included, 0);
    assert_eq!(totals.total_duration, 0.0);
}

#[test]
fn rerun_is_stable() {
    let mut scenes = vec![scene(1, Some(2.0)), scene(2, Some(3.0))];
    let first = accumulate(&mut scenes);
    let snapshot = scenes.clone();
    let second = accumulate(&mut scenes);
    assert_eq!(first, second);
    assert_eq!(scenes, snapshot);
}
