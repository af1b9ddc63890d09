use std::fmt;
use std::path::PathBuf;

use crate::scene::model::Scene;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Narrate,
    RenderLayers,
    Compose,
    Assemble,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Narrate => "narrate",
            Self::RenderLayers => "render-layers",
            Self::Compose => "compose",
            Self::Assemble => "assemble",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedScene {
    pub scene_id: u32,
    pub reason: String,
}

/// What one stage did to the scene sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    /// Scenes this stage did work for.
    pub processed: usize,
    /// Scenes whose output already existed.
    pub reused: usize,
    pub skipped: Vec<SkippedScene>,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            processed: 0,
            reused: 0,
            skipped: Vec::new(),
        }
    }

    pub fn skip(&mut self, scene_id: u32, reason: impl Into<String>) {
        self.skipped.push(SkippedScene {
            scene_id,
            reason: reason.into(),
        });
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} processed, {} reused, {} skipped",
            self.stage,
            self.processed,
            self.reused,
            self.skipped.len()
        )
    }
}

/// A stage's result: the updated sequence plus its report.
#[derive(Clone, Debug)]
pub struct StageOutput {
    pub scenes: Vec<Scene>,
    pub report: StageReport,
}

/// End-of-run summary printed by the CLI.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub processed: usize,
    pub skipped: usize,
    pub total_duration: f64,
}

fn scenes(n: usize) -> &'static str {
    if n == 1 { "scene" } else { "scenes" }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} processed, {} {} skipped, total duration {:.2}s",
            self.processed,
            scenes(self.processed),
            self.skipped,
            scenes(self.skipped),
            self.total_duration
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/report.rs"]
mod tests;
