use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ScenecutError, ScenecutResult};
use crate::scene::model::Scene;

/// Read a scene state file and check id ordering.
pub fn load_scenes(path: &Path) -> ScenecutResult<Vec<Scene>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read scene state '{}'", path.display()))?;
    let scenes: Vec<Scene> = serde_json::from_str(&raw)
        .map_err(|e| ScenecutError::serde(format!("scene state '{}': {e}", path.display())))?;
    validate_sequence(&scenes)?;
    Ok(scenes)
}

/// Write the scene sequence as pretty JSON.
///
/// The file is written to a sibling temp path and renamed over the target, so an interrupted
/// run leaves the previous state readable.
pub fn save_scenes(path: &Path, scenes: &[Scene]) -> ScenecutResult<()> {
    validate_sequence(scenes)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create state directory '{}'", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(scenes)
        .map_err(|e| ScenecutError::serde(format!("encode scene state: {e}")))?;
    let tmp = tmp_path(path);
    std::fs::write(&tmp, json).with_context(|| format!("write '{}'", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("replace scene state '{}'", path.display()))?;
    Ok(())
}

/// Ids must be 1-based, strictly increasing and gap-free.
pub fn validate_sequence(scenes: &[Scene]) -> ScenecutResult<()> {
    for (idx, scene) in scenes.iter().enumerate() {
        let expected = idx as u32 + 1;
        if scene.id != expected {
            return Err(ScenecutError::validation(format!(
                "scene ids must be 1-based and gap-free: position {} has id {}",
                idx + 1,
                scene.id
            )));
        }
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "scenes.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/store.rs"]
mod tests;
