//! Single-threaded host for the tower core.
//!
//! This crate supplies everything `tower-core` expects from its host: an
//! entity store implementing the collaborator traits, an event dispatcher, and
//! a [`Runtime`] that advances simulated time and routes scheduler firings.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`dispatch`] owns the event-kind to handler table
//! - [`world`] is the in-memory entity store
//! - [`scenario`] drives a runtime from RON scripts
pub mod dispatch;
pub mod error;
pub mod runtime;
pub mod scenario;
pub mod world;

pub use dispatch::{DispatchContext, EventDispatcher, EventHandler, EventPriority};
pub use error::{Result, RuntimeError};
pub use runtime::{Runtime, RuntimeBuilder, TowerSpec};
pub use scenario::{EnemyPlacement, Scenario, ScenarioOutcome, ScenarioStep, TowerPlacement};
pub use world::{DamageRecord, EntityRole, InMemoryWorld};
