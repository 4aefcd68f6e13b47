//! Tower configuration loader.

use std::path::Path;

use tower_core::TowerConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for tower configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a [`TowerConfig`] from a TOML file.
    ///
    /// Missing keys fall back to [`TowerConfig::default`].
    pub fn load(path: &Path) -> LoadResult<TowerConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<TowerConfig> {
        let config: TowerConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_core::{EffectKind, Vec3};

    #[test]
    fn missing_keys_use_defaults() {
        let config = ConfigLoader::parse("scan_period_ms = 250").unwrap();
        assert_eq!(config.scan_period_ms, 250);
        assert_eq!(config.turret_prefab, TowerConfig::DEFAULT_TURRET_PREFAB);
        assert_eq!(config.default_effect, EffectKind::DamageOverTime);
    }

    #[test]
    fn parses_every_field() {
        let config = ConfigLoader::parse(
            r#"
            turret_prefab = "Towers:ballista"
            turret_offset = { x = 0.0, y = 2.5, z = 0.0 }
            scan_period_ms = 500
            default_effect = "Poison"
            "#,
        )
        .unwrap();
        assert_eq!(config.turret_prefab, "Towers:ballista");
        assert_eq!(config.turret_offset, Vec3::new(0.0, 2.5, 0.0));
        assert_eq!(config.default_effect, EffectKind::Poison);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = ConfigLoader::parse("scan_period_ms = 0").unwrap_err();
        assert!(err.to_string().contains("scan period"), "{err}");
        assert!(ConfigLoader::parse("turret_prefab = \"\"").is_err());
        assert!(ConfigLoader::parse("scan_period_ms = \"fast\"").is_err());
    }
}
