//! Content factory for loading every tower data file from one directory.

use std::path::{Path, PathBuf};

use tower_core::{EffectRegistry, Prefab, TowerConfig};

use crate::loaders::{ConfigLoader, EffectLoader, LoadResult, PrefabLoader};

/// Content factory that loads all tower content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── effects.ron
/// ├── prefabs.ron
/// └── scenarios/
///     └── demo.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load tower configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<TowerConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load effect definitions from `effects.ron`.
    pub fn load_effects(&self) -> LoadResult<EffectRegistry> {
        EffectLoader::load(&self.data_dir.join("effects.ron"))
    }

    /// Load the prefab catalog from `prefabs.ron`.
    pub fn load_prefabs(&self) -> LoadResult<Vec<Prefab>> {
        PrefabLoader::load(&self.data_dir.join("prefabs.ron"))
    }

    /// Path of `scenarios/{name}.ron`.
    pub fn scenario_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("scenarios").join(format!("{}.ron", name))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
