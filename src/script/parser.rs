use tracing::{debug, warn};

use crate::foundation::error::ScenecutResult;
use crate::scene::model::{LegacyKind, Scene, VisualRequirements};
use crate::script::marker::parse_marker;
use crate::timeline::estimate::estimate_duration;

struct OpenScene {
    marker_line: usize,
    legacy: Option<LegacyKind>,
    visual: VisualRequirements,
    narration: String,
}

/// Parse a marked-up narration script into the ordered scene sequence.
///
/// Markers that collect no narration before the next marker (or end of input) are dropped and
/// do not consume a scene id. Narration before the first marker is ignored.
pub fn parse_script(text: &str, words_per_minute: u32) -> ScenecutResult<Vec<Scene>> {
    let mut scenes = Vec::new();
    let mut open: Option<OpenScene> = None;
    let mut orphan_lines = 0usize;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match parse_marker(line, line_no)? {
            Some(marker) => {
                let visual = marker.visual_requirements(line_no)?;
                if let Some(prev) = open.take() {
                    close_scene(prev, &mut scenes, words_per_minute);
                }
                open = Some(OpenScene {
                    marker_line: line_no,
                    legacy: marker.marker_type.legacy(),
                    visual,
                    narration: String::new(),
                });
            }
            None => match open.as_mut() {
                Some(scene) => {
                    if !scene.narration.is_empty() {
                        scene.narration.push(' ');
                    }
                    scene.narration.push_str(line);
                }
                None => orphan_lines += 1,
            },
        }
    }

    if let Some(last) = open.take() {
        close_scene(last, &mut scenes, words_per_minute);
    }
    if orphan_lines > 0 {
        warn!(
            lines = orphan_lines,
            "ignored narration before the first scene marker"
        );
    }

    debug!(scenes = scenes.len(), "parsed script");
    Ok(scenes)
}

fn close_scene(open: OpenScene, scenes: &mut Vec<Scene>, words_per_minute: u32) {
    if open.narration.is_empty() {
        warn!(
            line = open.marker_line,
            kind = %open.visual.sources.kind(),
            "dropping scene marker with no narration"
        );
        return;
    }

    let id = scenes.len() as u32 + 1;
    let mut scene = Scene::new(id, open.visual, open.narration);
    scene.original_type = open.legacy;
    scene.duration_estimate = estimate_duration(&scene.narration_text, words_per_minute);
    scenes.push(scene);
}

#[cfg(test)]
#[path = "../../tests/unit/script/parser.rs"]
mod tests;
