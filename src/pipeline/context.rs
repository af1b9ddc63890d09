use std::path::{Path, PathBuf};

use crate::assets::paths::AssetPaths;
use crate::foundation::config::PipelineConfig;
use crate::foundation::error::ScenecutResult;
use crate::scene::model::Scene;
use crate::scene::store::{load_scenes, save_scenes};

/// Everything a stage needs besides the scenes themselves.
#[derive(Clone, Debug)]
pub struct PipelineContext {
    pub config: PipelineConfig,
    pub paths: AssetPaths,
    state_path: PathBuf,
}

impl PipelineContext {
    /// Validate `config` and fix where the scene state file lives (the configured work dir
    /// unless `state_path` overrides it).
    pub fn new(config: PipelineConfig, state_path: Option<PathBuf>) -> ScenecutResult<Self> {
        config.validate()?;
        let paths = AssetPaths::from_config(&config.paths);
        let state_path = state_path.unwrap_or_else(|| paths.scene_state());
        Ok(Self {
            config,
            paths,
            state_path,
        })
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn load_state(&self) -> ScenecutResult<Vec<Scene>> {
        load_scenes(&self.state_path)
    }

    pub fn save_state(&self, scenes: &[Scene]) -> ScenecutResult<()> {
        save_scenes(&self.state_path, scenes)
    }
}
