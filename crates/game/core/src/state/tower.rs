//! Per-tower state records.

use std::collections::BTreeSet;

use crate::config::ConfigError;
use crate::state::EntityId;

/// Structural phase of a tower, derived from its turret attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TowerPhase {
    Inactive,
    Active,
}

/// State attached to a tower entity.
///
/// # Invariants
///
/// - `child` is non-null only while the tower is activated and activation completed
/// - A tower never holds more than one child
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TowerState {
    /// Whether the tower should be seeking targets.
    pub is_activated: bool,

    /// Spawned turret attachment, or [`EntityId::NULL`].
    pub child: EntityId,

    /// Effector entities whose effects the tower applies on each scan.
    ///
    /// Empty means the tower applies the configured default effect itself.
    pub effectors: Vec<EntityId>,

    /// Target selection parameters and last-attack bookkeeping.
    pub targeter: TargeterState,
}

impl TowerState {
    pub fn new(targeter: TargeterState) -> Self {
        Self {
            is_activated: false,
            child: EntityId::NULL,
            effectors: Vec::new(),
            targeter,
        }
    }

    pub fn activated(mut self, is_activated: bool) -> Self {
        self.is_activated = is_activated;
        self
    }

    pub fn with_effectors(mut self, effectors: impl IntoIterator<Item = EntityId>) -> Self {
        self.effectors = effectors.into_iter().collect();
        self
    }

    /// Scan range of the tower.
    pub fn range(&self) -> f32 {
        self.targeter.range
    }

    /// Returns true if a turret attachment is currently spawned.
    pub fn has_child(&self) -> bool {
        !self.child.is_null()
    }

    pub fn phase(&self) -> TowerPhase {
        if self.has_child() {
            TowerPhase::Active
        } else {
            TowerPhase::Inactive
        }
    }
}

/// Targeting parameters of a tower.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargeterState {
    /// Range in world units. Always finite and non-negative.
    pub range: f32,

    /// Time between attacks in milliseconds. Always non-zero.
    pub attack_speed_ms: u64,

    /// Enemies selected on the most recent attack cycle.
    pub affected_enemies: BTreeSet<EntityId>,

    /// Balancing multiplier passed to every effector of the tower.
    pub multiplier: f32,
}

impl TargeterState {
    pub fn new(range: f32, attack_speed_ms: u64) -> Result<Self, ConfigError> {
        if !range.is_finite() || range < 0.0 {
            return Err(ConfigError::InvalidRange(range));
        }
        if attack_speed_ms == 0 {
            return Err(ConfigError::ZeroScanPeriod);
        }
        Ok(Self {
            range,
            attack_speed_ms,
            affected_enemies: BTreeSet::new(),
            multiplier: 1.0,
        })
    }

    pub fn with_multiplier(mut self, multiplier: f32) -> Result<Self, ConfigError> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(ConfigError::InvalidMultiplier(multiplier));
        }
        self.multiplier = multiplier;
        Ok(self)
    }

    /// Replaces the affected set with this cycle's hits and returns the previous one.
    pub fn record_hits(&mut self, hits: BTreeSet<EntityId>) -> BTreeSet<EntityId> {
        std::mem::replace(&mut self.affected_enemies, hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tower_is_inactive_without_child() {
        let tower = TowerState::new(TargeterState::new(5.0, 1000).unwrap());
        assert!(!tower.is_activated);
        assert_eq!(tower.phase(), TowerPhase::Inactive);
        assert_eq!(tower.range(), 5.0);
    }

    #[test]
    fn targeter_rejects_negative_range() {
        assert_eq!(
            TargeterState::new(-1.0, 1000),
            Err(ConfigError::InvalidRange(-1.0))
        );
        assert!(TargeterState::new(f32::NAN, 1000).is_err());
        assert_eq!(
            TargeterState::new(1.0, 0),
            Err(ConfigError::ZeroScanPeriod)
        );
    }

    #[test]
    fn record_hits_returns_previous_cycle() {
        let mut targeter = TargeterState::new(3.0, 500).unwrap();
        let first: BTreeSet<_> = [EntityId(1), EntityId(2)].into_iter().collect();
        assert!(targeter.record_hits(first.clone()).is_empty());

        let previous = targeter.record_hits([EntityId(3)].into_iter().collect());
        assert_eq!(previous, first);
        assert_eq!(
            targeter.affected_enemies,
            [EntityId(3)].into_iter().collect()
        );
    }
}
