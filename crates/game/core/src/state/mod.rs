//! State records owned by the host and handed to the core by exclusive reference.
//!
//! The core never stores these records itself. A host keeps one
//! [`TowerState`] per tower entity, takes it out of its table when a handler
//! runs, and writes it back afterwards.
mod common;
mod tower;

pub use common::{EntityId, Tick, Vec3};
pub use tower::{TargeterState, TowerPhase, TowerState};
