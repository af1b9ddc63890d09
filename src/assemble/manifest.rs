use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::warn;

use crate::assets::paths::AssetPaths;
use crate::foundation::error::ScenecutResult;
use crate::scene::model::Scene;

#[derive(Clone, Debug, PartialEq)]
pub struct ManifestEntry {
    pub scene_id: u32,
    pub path: PathBuf,
    pub duration: f64,
    /// Encoder recorded for the scene file; `None` when its origin is unknown.
    pub codec: Option<String>,
}

/// Concat order plus the scenes that did not make it in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    pub skipped: Vec<u32>,
}

impl Manifest {
    /// Sum of the included scenes' narration durations.
    pub fn total_duration(&self) -> f64 {
        self.entries.iter().map(|e| e.duration).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codecs(&self) -> Vec<Option<&str>> {
        self.entries.iter().map(|e| e.codec.as_deref()).collect()
    }

    /// `true` when the files can be joined without re-encoding: a single file, or every file
    /// encoded by the same known codec.
    pub fn stream_copy_safe(&self) -> bool {
        match self.entries.as_slice() {
            [_] => true,
            [first, rest @ ..] => {
                first.codec.is_some() && rest.iter().all(|e| e.codec == first.codec)
            }
            [] => false,
        }
    }
}

/// Collect composited scene files in ascending scene id.
///
/// A scene is included when it has measured audio and a composite on disk (its `video_file`,
/// or the canonical composite path). Everything else is skipped with a warning.
pub fn build_manifest(scenes: &[Scene], paths: &AssetPaths) -> Manifest {
    let mut ordered: Vec<&Scene> = scenes.iter().collect();
    ordered.sort_by_key(|s| s.id);

    let mut manifest = Manifest::default();
    for scene in ordered {
        let Some(duration) = scene.audio_duration.filter(|_| scene.has_audio()) else {
            warn!(scene_id = scene.id, "skipping scene without narration audio");
            manifest.skipped.push(scene.id);
            continue;
        };
        let video = scene
            .video_file
            .clone()
            .filter(|p| p.is_file())
            .or_else(|| Some(paths.composited(scene.id)).filter(|p| p.is_file()));
        match video {
            Some(path) => manifest.entries.push(ManifestEntry {
                scene_id: scene.id,
                path,
                duration,
                codec: scene.video_codec.clone(),
            }),
            None => {
                warn!(scene_id = scene.id, "skipping scene without a composited video");
                manifest.skipped.push(scene.id);
            }
        }
    }
    manifest
}

/// Quote a path for the concat demuxer: single quotes, embedded `'` written as `'\''`.
pub fn quote_concat_path(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// Concat-demuxer list: one `file` line per entry followed by its `duration`.
///
/// Paths are made absolute so the list can live anywhere.
pub fn render_manifest(manifest: &Manifest) -> String {
    let mut out = String::new();
    for entry in &manifest.entries {
        let abs = std::path::absolute(&entry.path).unwrap_or_else(|_| entry.path.clone());
        let _ = writeln!(out, "file {}", quote_concat_path(&abs));
        let _ = writeln!(out, "duration {:.3}", entry.duration);
    }
    out
}

pub fn write_manifest(path: &Path, manifest: &Manifest) -> ScenecutResult<()> {
    crate::encode::ffmpeg::ensure_parent_dir(path)?;
    std::fs::write(path, render_manifest(manifest))
        .with_context(|| format!("write concat list '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/manifest.rs"]
mod tests;
