//! Prefab catalog loader.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tower_core::Prefab;

use crate::loaders::{LoadResult, read_file};

/// Prefab catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefabCatalog {
    pub prefabs: Vec<Prefab>,
}

/// Loader for the prefab catalog from RON files.
pub struct PrefabLoader;

impl PrefabLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<Prefab>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<Prefab>> {
        let catalog: PrefabCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse prefab catalog RON: {}", e))?;

        if let Some(empty) = catalog.prefabs.iter().position(|p| p.name.is_empty()) {
            anyhow::bail!("Prefab at index {} has an empty name", empty);
        }
        Ok(catalog.prefabs)
    }
}
