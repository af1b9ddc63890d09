use std::path::PathBuf;

use crate::scene::model::LayerKind;

/// Convenience result type used across scenecut.
pub type ScenecutResult<T> = Result<T, ScenecutError>;

/// Top-level error taxonomy.
///
/// `Parse` and `Assembly` abort a run. `MissingAsset`, `Composition`, `Narration` and `Render`
/// are scene-local: the pipeline turns them into a skip entry and moves on to the next scene.
#[derive(thiserror::Error, Debug)]
pub enum ScenecutError {
    /// Malformed or unrecognized scene marker.
    #[error("parse error (line {line}): {message}")]
    Parse { line: usize, message: String },

    /// A required layer source file is absent.
    #[error("missing asset: scene {scene_id} has no {layer} layer at '{}'", path.display())]
    MissingAsset {
        scene_id: u32,
        layer: LayerKind,
        path: PathBuf,
    },

    /// Filter-graph or encode failure after every encoder strategy was tried.
    #[error("composition error (scene {scene_id}): {message}")]
    Composition { scene_id: u32, message: String },

    /// Concatenation or final encode failure.
    #[error("assembly error: {0}")]
    Assembly(String),

    /// Narration synthesis failed for one scene.
    #[error("narration error (scene {scene_id}): {message}")]
    Narration { scene_id: u32, message: String },

    /// An external layer renderer failed for one scene.
    #[error("render error (scene {scene_id}, {layer} layer): {message}")]
    Render {
        scene_id: u32,
        layer: LayerKind,
        message: String,
    },

    /// Invalid configuration or scene state.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing the scene state file.
    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScenecutError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn composition(scene_id: u32, message: impl Into<String>) -> Self {
        Self::Composition {
            scene_id,
            message: message.into(),
        }
    }

    pub fn narration(scene_id: u32, message: impl Into<String>) -> Self {
        Self::Narration {
            scene_id,
            message: message.into(),
        }
    }

    pub fn render(scene_id: u32, layer: LayerKind, message: impl Into<String>) -> Self {
        Self::Render {
            scene_id,
            layer,
            message: message.into(),
        }
    }

    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors that only invalidate a single scene.
    pub fn is_scene_local(&self) -> bool {
        matches!(
            self,
            Self::MissingAsset { .. }
                | Self::Composition { .. }
                | Self::Narration { .. }
                | Self::Render { .. }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
