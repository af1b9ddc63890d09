use std::path::{Path, PathBuf};

use crate::foundation::config::PathsConfig;
use crate::scene::model::LayerKind;

/// Every on-disk naming convention the pipeline relies on.
///
/// Directories are resolved against the configured root once, at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetPaths {
    root: PathBuf,
    stock_dir: PathBuf,
    infographic_dir: PathBuf,
    avatar_dir: PathBuf,
    composited_dir: PathBuf,
    audio_dir: PathBuf,
    work_dir: PathBuf,
}

impl AssetPaths {
    pub fn from_config(cfg: &PathsConfig) -> Self {
        let root = cfg.root.clone();
        Self {
            stock_dir: root.join(&cfg.stock_dir),
            infographic_dir: root.join(&cfg.infographic_dir),
            avatar_dir: root.join(&cfg.avatar_dir),
            composited_dir: root.join(&cfg.composited_dir),
            audio_dir: root.join(&cfg.audio_dir),
            work_dir: root.join(&cfg.work_dir),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical source path for one layer of a scene.
    ///
    /// `explicit` is the file name given in the marker, when any. Infographic ids without an
    /// extension get `.mp4` appended.
    pub fn layer_source(&self, scene_id: u32, layer: LayerKind, explicit: Option<&str>) -> PathBuf {
        let explicit = explicit.map(str::trim).filter(|s| !s.is_empty());
        match layer {
            LayerKind::Stock => self.stock_dir.join(match explicit {
                Some(name) => name.to_string(),
                None => format!("scene_{scene_id}.mp4"),
            }),
            LayerKind::Infographic => {
                let name = explicit
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("scene_{scene_id}"));
                let path = self.infographic_dir.join(name);
                if path.extension().is_some() {
                    path
                } else {
                    path.with_extension("mp4")
                }
            }
            LayerKind::Avatar => self.avatar_dir.join(match explicit {
                Some(name) => name.to_string(),
                None => format!("scene_{scene_id:03}.mp4"),
            }),
        }
    }

    /// Write-once output of the compositor for `scene_id`.
    pub fn composited(&self, scene_id: u32) -> PathBuf {
        self.composited_dir
            .join(format!("scene_{scene_id:03}_composite.mp4"))
    }

    pub fn audio(&self, scene_id: u32) -> PathBuf {
        self.audio_dir.join(format!("scene_{scene_id:03}.wav"))
    }

    pub fn concat_manifest(&self) -> PathBuf {
        self.work_dir.join("concat_list.txt")
    }

    /// Default location of the scene state file.
    pub fn scene_state(&self) -> PathBuf {
        self.work_dir.join("scene_timing.json")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/paths.rs"]
mod tests;
