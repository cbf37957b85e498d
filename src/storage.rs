//! Workspace session persistence.
//!
//! The current workspace survives between CLI invocations in the platform
//! data directory, so `upload`, `generate`, `watch` and `export` can run as
//! separate commands against the same product.

use crate::workspace::Workspace;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "multilister";
const WORKSPACE_FILE: &str = "workspace.json";

fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("no platform data directory available")?;
    Ok(base.join(APP_DIR))
}

pub fn workspace_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(WORKSPACE_FILE))
}

/// Load the persisted workspace, or a fresh one when none was saved yet.
pub fn load_workspace() -> Result<Workspace> {
    load_from(&workspace_path()?)
}

pub fn save_workspace(workspace: &Workspace) -> Result<PathBuf> {
    let path = workspace_path()?;
    save_to(&path, workspace)?;
    Ok(path)
}

fn load_from(path: &Path) -> Result<Workspace> {
    if !path.exists() {
        return Ok(Workspace::new());
    }
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

fn save_to(path: &Path, workspace: &Workspace) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(workspace)?;
    std::fs::write(path, raw).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoreContent;

    #[test]
    fn missing_file_yields_a_fresh_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let ws = load_from(&dir.path().join("workspace.json")).unwrap();
        assert!(ws.product_id.is_none());
        assert!(!ws.generating);
    }

    #[test]
    fn workspace_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("workspace.json");

        let mut ws = Workspace::new();
        ws.product_id = Some("p1".into());
        ws.main_image = Some("https://cdn.example/p.jpg".into());
        ws.description = "Blue ceramic mug".into();
        ws.generating = true;
        ws.results.insert(
            "s1".into(),
            StoreContent {
                title: "Mug".into(),
                description: "d".into(),
                tags: vec!["mug".into()],
                images: vec!["https://cdn.example/a.jpg".into()],
            },
        );

        save_to(&path, &ws).unwrap();
        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.product_id.as_deref(), Some("p1"));
        assert!(loaded.generating);
        assert!(loaded.results.contains_key("s1"));
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_silent_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_from(&path).is_err());
    }
}
