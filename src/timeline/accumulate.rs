use tracing::debug;

use crate::scene::model::Scene;

/// Result of one prefix-sum pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimelineTotals {
    pub included: usize,
    pub excluded: usize,
    pub total_duration: f64,
}

/// Recompute `start_time`/`end_time` as a left-to-right prefix sum over `audio_duration`.
///
/// Scenes without audio get their offsets cleared and do not advance the clock, so the next
/// timed scene starts exactly where the previous timed one ended.
pub fn accumulate(scenes: &mut [Scene]) -> TimelineTotals {
    let mut totals = TimelineTotals::default();
    let mut cursor = 0.0f64;

    for scene in scenes.iter_mut() {
        match (scene.has_audio(), scene.audio_duration) {
            (true, Some(duration)) => {
                scene.start_time = Some(cursor);
                cursor += duration;
                scene.end_time = Some(cursor);
                totals.included += 1;
            }
            _ => {
                scene.start_time = None;
                scene.end_time = None;
                totals.excluded += 1;
            }
        }
    }

    totals.total_duration = cursor;
    debug!(
        included = totals.included,
        excluded = totals.excluded,
        total = totals.total_duration,
        "timeline accumulated"
    );
    totals
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/accumulate.rs"]
mod tests;
