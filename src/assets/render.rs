use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::encode::process::{run_with_timeout, tail_lines};
use crate::foundation::config::CommandSpec;
use crate::foundation::error::{ScenecutError, ScenecutResult};
use crate::scene::model::{LayerKind, Scene};

/// Produces one layer source file for a scene.
pub trait LayerRenderer {
    fn layer(&self) -> LayerKind;

    /// Write the layer for `scene` to `out_path`.
    fn render(&mut self, scene: &Scene, out_path: &Path) -> ScenecutResult<()>;
}

/// Runs an external program per scene.
///
/// Arguments may use `{scene_id}`, `{out}` and `{audio}`. A template that mentions `{audio}`
/// fails for scenes without narration audio.
#[derive(Clone, Debug)]
pub struct CommandRenderer {
    layer: LayerKind,
    spec: CommandSpec,
    timeout: Duration,
}

impl CommandRenderer {
    pub fn new(layer: LayerKind, spec: CommandSpec, timeout: Duration) -> Self {
        Self {
            layer,
            spec,
            timeout,
        }
    }
}

impl LayerRenderer for CommandRenderer {
    fn layer(&self) -> LayerKind {
        self.layer
    }

    fn render(&mut self, scene: &Scene, out_path: &Path) -> ScenecutResult<()> {
        let audio = match &scene.audio_file {
            Some(a) => a.to_string_lossy().to_string(),
            None if self.spec.uses("audio") => {
                return Err(ScenecutError::render(
                    scene.id,
                    self.layer,
                    "renderer needs narration audio but the scene has none",
                ));
            }
            None => String::new(),
        };
        crate::encode::ffmpeg::ensure_parent_dir(out_path)?;

        let scene_id = scene.id.to_string();
        let out = out_path.to_string_lossy().to_string();
        let mut cmd = self.spec.command(&[
            ("scene_id", scene_id.as_str()),
            ("out", out.as_str()),
            ("audio", audio.as_str()),
        ]);
        info!(scene_id = scene.id, layer = %self.layer, program = %self.spec.program, "rendering layer");

        let result = run_with_timeout(&mut cmd, None, self.timeout)
            .map_err(|e| ScenecutError::render(scene.id, self.layer, e.to_string()))?;
        if !result.status.success() {
            return Err(ScenecutError::render(
                scene.id,
                self.layer,
                format!(
                    "'{}' exited with {}: {}",
                    self.spec.program,
                    result.status,
                    tail_lines(&result.stderr_lossy(), 10)
                ),
            ));
        }
        if !out_path.is_file() {
            return Err(ScenecutError::render(
                scene.id,
                self.layer,
                format!("'{}' did not write '{}'", self.spec.program, out_path.display()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/render.rs"]
mod tests;
