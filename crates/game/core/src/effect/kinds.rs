//! Effect kinds and their immutable descriptors.

use crate::config::ConfigError;

/// Tag identifying an effect kind.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EffectKind {
    /// Initial hit followed by fast damage ticks; same-source refresh.
    Poison,
    /// Slow damage ticks applied by bare towers.
    DamageOverTime,
    /// A single hit with no lingering effect.
    Strike,
}

/// How often an effect is applied over a tower's attack cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectCount {
    /// Applied to every selected target on every attack.
    #[default]
    PerShot,
    /// Applied once when a target enters range, removed when it leaves.
    Continuous,
}

/// How an effect's lifetime is tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    /// Only the initial damage; no timers.
    Instant,
    /// Periodic ticks until an end timer expires.
    #[default]
    Lasting,
    /// Periodic ticks until explicitly removed. Only valid for
    /// [`EffectCount::Continuous`], whose targets are released on leaving range.
    Permanent,
}

/// What a same-source reapplication does to a running end timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackingPolicy {
    /// Restart the end timer at the full lifetime.
    #[default]
    Refresh,
    /// Add the full lifetime to whatever remains.
    Extend,
}

/// Immutable descriptor of an effect kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefinition {
    pub kind: EffectKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub count: EffectCount,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: EffectDuration,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stacking: StackingPolicy,
    /// Damage delivered on every application.
    pub initial_damage: u32,
    /// Damage delivered on every periodic tick.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_damage: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_period_ms: u64,
    /// Lifetime of a lasting effect.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lifetime_ms: u64,
    /// Visual/audio cue started on onset and stopped on expiry.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cue: Option<String>,
}

impl EffectDefinition {
    /// Poison: same-source reapplication refreshes the lifetime only.
    pub fn poison() -> Self {
        Self {
            kind: EffectKind::Poison,
            count: EffectCount::PerShot,
            duration: EffectDuration::Lasting,
            stacking: StackingPolicy::Refresh,
            initial_damage: 2,
            tick_damage: 1,
            tick_period_ms: 200,
            lifetime_ms: 3000,
            cue: Some("Towers:PoisonParticleEffect".to_string()),
        }
    }

    /// Damage over time applied by a tower without effectors.
    pub fn damage_over_time() -> Self {
        Self {
            kind: EffectKind::DamageOverTime,
            count: EffectCount::PerShot,
            duration: EffectDuration::Lasting,
            stacking: StackingPolicy::Extend,
            initial_damage: 10,
            tick_damage: 10,
            tick_period_ms: 500,
            lifetime_ms: 1000,
            cue: None,
        }
    }

    pub fn strike() -> Self {
        Self {
            kind: EffectKind::Strike,
            count: EffectCount::PerShot,
            duration: EffectDuration::Instant,
            stacking: StackingPolicy::Refresh,
            initial_damage: 15,
            tick_damage: 0,
            tick_period_ms: 0,
            lifetime_ms: 0,
            cue: None,
        }
    }

    /// Returns true if applications arm timers on the target.
    pub fn is_timed(&self) -> bool {
        !matches!(self.duration, EffectDuration::Instant)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidEffect {
            kind: self.kind,
            reason,
        };
        if self.is_timed() && self.tick_period_ms == 0 {
            return Err(invalid("timed effects need a non-zero tick period"));
        }
        if matches!(self.duration, EffectDuration::Lasting) && self.lifetime_ms == 0 {
            return Err(invalid("lasting effects need a non-zero lifetime"));
        }
        if matches!(self.count, EffectCount::Continuous)
            && matches!(self.duration, EffectDuration::Instant)
        {
            return Err(invalid("continuous effects cannot be instant"));
        }
        if matches!(self.duration, EffectDuration::Permanent)
            && !matches!(self.count, EffectCount::Continuous)
        {
            return Err(invalid("permanent effects must be continuous"));
        }
        Ok(())
    }
}
