//! Effect definition loader.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tower_core::{EffectDefinition, EffectRegistry};

use crate::loaders::{LoadResult, read_file};

/// Effect catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectCatalog {
    pub effects: Vec<EffectDefinition>,
}

/// Loader for effect definitions from RON files.
pub struct EffectLoader;

impl EffectLoader {
    /// Load an [`EffectRegistry`] from a RON file.
    ///
    /// Every definition is validated; duplicate kinds are rejected.
    pub fn load(path: &Path) -> LoadResult<EffectRegistry> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid effects {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<EffectRegistry> {
        let catalog: EffectCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse effect catalog RON: {}", e))?;
        Ok(EffectRegistry::from_definitions(catalog.effects)?)
    }
}
