use std::path::PathBuf;

use tracing::debug;

use crate::assets::paths::AssetPaths;
use crate::foundation::error::{ScenecutError, ScenecutResult};
use crate::scene::model::{LayerKind, Scene};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedLayer {
    pub kind: LayerKind,
    pub path: PathBuf,
}

/// Resolved layers, bottom to top. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerStack {
    pub layers: Vec<ResolvedLayer>,
}

impl LayerStack {
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A finished composite already exists; no layer lookup happened.
    Precomposited(PathBuf),
    Layers(LayerStack),
}

/// Where the source for `layer` of `scene` is expected, whether or not it exists.
pub fn expected_layer_path(scene: &Scene, layer: LayerKind, paths: &AssetPaths) -> PathBuf {
    match layer {
        LayerKind::Stock => {
            paths.layer_source(scene.id, layer, scene.visual.sources.stock_file())
        }
        LayerKind::Infographic => {
            paths.layer_source(scene.id, layer, scene.visual.sources.infographic_id())
        }
        LayerKind::Avatar => scene
            .avatar_video
            .clone()
            .unwrap_or_else(|| paths.layer_source(scene.id, layer, None)),
    }
}

/// Resolve the files a scene is composited from.
///
/// An attached `video_file` or a composite at the canonical path wins outright. Otherwise every
/// required layer must exist; the first absent one is reported as [`ScenecutError::MissingAsset`].
/// Only reads the filesystem, so calling it twice gives the same answer.
pub fn resolve_scene(scene: &Scene, paths: &AssetPaths) -> ScenecutResult<Resolution> {
    if let Some(existing) = scene.video_file.as_ref().filter(|p| p.is_file()) {
        debug!(scene_id = scene.id, path = %existing.display(), "scene already composited");
        return Ok(Resolution::Precomposited(existing.clone()));
    }
    let canonical = paths.composited(scene.id);
    if canonical.is_file() {
        debug!(scene_id = scene.id, path = %canonical.display(), "found pre-composited scene");
        return Ok(Resolution::Precomposited(canonical));
    }

    let mut layers = Vec::new();
    for kind in scene.required_layers() {
        let path = expected_layer_path(scene, kind, paths);
        if !path.is_file() {
            return Err(ScenecutError::MissingAsset {
                scene_id: scene.id,
                layer: kind,
                path,
            });
        }
        layers.push(ResolvedLayer { kind, path });
    }
    Ok(Resolution::Layers(LayerStack { layers }))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
