//! Traits describing the host world the core drives.
//!
//! The core never owns entity storage. Entity creation and destruction,
//! component lookups, candidate enumeration, damage and cues are requested
//! through these traits. [`World`] bundles them so handlers can take a single
//! `&mut dyn World`.
mod entities;
mod prefabs;
mod sinks;

pub use entities::{EntityManager, TargetSource};
pub use prefabs::{Prefab, PrefabResolver};
pub use sinks::{CueSink, DamageSink};

/// Every collaborator the core needs, as one trait object.
pub trait World: EntityManager + PrefabResolver + TargetSource + DamageSink + CueSink {}

impl<T> World for T where
    T: EntityManager + PrefabResolver + TargetSource + DamageSink + CueSink + ?Sized
{
}
