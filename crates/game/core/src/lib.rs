//! Timed-effect scheduling and targeting core for tower defense.
//!
//! `tower-core` decides when an active tower scans for enemies, which enemies
//! are in range, how effects are applied to them, and how overlapping effects
//! interact. Entity storage, asset resolution, damage and visual cues live in
//! the host and are reached through the traits in [`env`].
//!
//! Modules are organized leaf-first:
//! - [`scheduler`] keyed one-shot and periodic timers
//! - [`effect`] effect definitions, the registry, and the applier
//! - [`targeting`] range queries over candidate targets
//! - [`lifecycle`] the per-tower activation state machine
//! - [`events`] inbound notifications the host delivers to the core
pub mod config;
pub mod context;
pub mod effect;
pub mod env;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod scheduler;
pub mod state;
pub mod targeting;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, TowerConfig};
pub use context::SystemContext;
pub use effect::{
    Application, EffectApplier, EffectCount, EffectDefinition, EffectDuration, EffectError,
    EffectKind, EffectRegistry, StackingPolicy,
};
pub use env::{CueSink, DamageSink, EntityManager, Prefab, PrefabResolver, TargetSource, World};
pub use error::{CoreError, ErrorSeverity};
pub use events::{EventKind, TowerEvent};
pub use lifecycle::{LifecycleError, ScanReport, TowerLifecycleManager, Transition};
pub use scheduler::{
    ActionId, ActionIdParseError, ActionKey, ActionKind, ActionPurpose, ActionScheduler,
    FiredAction, SchedulerError,
};
pub use state::{EntityId, TargeterState, Tick, TowerPhase, TowerState, Vec3};
pub use targeting::TargetSelector;
