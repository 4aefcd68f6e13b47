//! Effect definitions, the registry of stock effects, and the applier.
//!
//! An effect is applied by an *effector* entity to a *target* entity. Its
//! timers live on the target and carry the effector in their [`ActionId`],
//! so two effectors never share timers even when they apply the same kind.
//!
//! [`ActionId`]: crate::scheduler::ActionId
mod applier;
mod error;
mod kinds;
mod registry;

pub use applier::{Application, EffectApplier};
pub use error::EffectError;
pub use kinds::{EffectCount, EffectDefinition, EffectDuration, EffectKind, StackingPolicy};
pub use registry::EffectRegistry;
