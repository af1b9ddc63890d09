use std::fmt::Write as _;

use crate::scene::model::Scene;

/// Render an SRT caption track from the accumulated timeline.
///
/// One cue per timed scene, in scene order, numbered from 1. Scenes without offsets are
/// skipped the same way they are skipped from assembly.
pub fn render_srt(scenes: &[Scene]) -> String {
    let mut out = String::new();
    let mut cue = 0u32;
    for scene in scenes {
        let (Some(start), Some(end)) = (scene.start_time, scene.end_time) else {
            continue;
        };
        cue += 1;
        let _ = writeln!(out, "{cue}");
        let _ = writeln!(
            out,
            "{} --> {}",
            srt_timestamp(start),
            srt_timestamp(end)
        );
        let _ = writeln!(out, "{}", scene.narration_text.trim());
        out.push('\n');
    }
    out
}

/// `HH:MM:SS,mmm`, rounded to the nearest millisecond.
pub fn srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    let s = total_s % 60;
    let m = (total_s / 60) % 60;
    let h = total_s / 3600;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/captions.rs"]
mod tests;
