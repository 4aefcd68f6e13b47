//! Tower configuration and validation errors.

use crate::effect::EffectKind;
use crate::error::{CoreError, ErrorSeverity};
use crate::state::Vec3;

/// Tunable parameters shared by every tower the core manages.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TowerConfig {
    /// Prefab spawned as the turret attachment when a tower activates.
    pub turret_prefab: String,

    /// Local offset of the turret relative to its tower.
    pub turret_offset: Vec3,

    /// Scan period used when a tower is built without an explicit attack speed.
    pub scan_period_ms: u64,

    /// Effect a tower applies when it has no effector entities of its own.
    pub default_effect: EffectKind,
}

impl TowerConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TURRET_PREFAB: &'static str = "Towers:testRook";
    pub const DEFAULT_TURRET_OFFSET: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const DEFAULT_SCAN_PERIOD_MS: u64 = 1000;

    pub fn new() -> Self {
        Self {
            turret_prefab: Self::DEFAULT_TURRET_PREFAB.to_string(),
            turret_offset: Self::DEFAULT_TURRET_OFFSET,
            scan_period_ms: Self::DEFAULT_SCAN_PERIOD_MS,
            default_effect: EffectKind::DamageOverTime,
        }
    }

    /// Checks values that would otherwise stall or corrupt scheduling.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.turret_prefab.is_empty() {
            return Err(ConfigError::EmptyPrefabName);
        }
        if self.scan_period_ms == 0 {
            return Err(ConfigError::ZeroScanPeriod);
        }
        Ok(())
    }
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised while validating configuration and content.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("turret prefab name must not be empty")]
    EmptyPrefabName,

    #[error("scan period must be greater than zero")]
    ZeroScanPeriod,

    #[error("range must be a finite non-negative number (got {0})")]
    InvalidRange(f32),

    #[error("multiplier must be a finite non-negative number (got {0})")]
    InvalidMultiplier(f32),

    #[error("effect '{kind}' is invalid: {reason}")]
    InvalidEffect {
        kind: EffectKind,
        reason: &'static str,
    },

    #[error("effect '{0}' is defined more than once")]
    DuplicateEffect(EffectKind),
}

impl CoreError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use ConfigError::*;
        match self {
            EmptyPrefabName => "CONFIG_EMPTY_PREFAB_NAME",
            ZeroScanPeriod => "CONFIG_ZERO_SCAN_PERIOD",
            InvalidRange(_) => "CONFIG_INVALID_RANGE",
            InvalidMultiplier(_) => "CONFIG_INVALID_MULTIPLIER",
            InvalidEffect { .. } => "CONFIG_INVALID_EFFECT",
            DuplicateEffect(_) => "CONFIG_DUPLICATE_EFFECT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TowerConfig::default();
        assert_eq!(config.turret_prefab, "Towers:testRook");
        assert_eq!(config.turret_offset, Vec3::new(0.0, 1.0, 0.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_scan_period() {
        let config = TowerConfig {
            scan_period_ms: 0,
            ..TowerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroScanPeriod));
    }
}
