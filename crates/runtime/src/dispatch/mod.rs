//! Event dispatch for tower lifecycle and timer notifications.
//!
//! Every [`TowerEvent`](tower_core::TowerEvent) is routed through one
//! [`EventDispatcher`]: a table from event kind to the handlers registered for
//! it, delivered in ascending [`EventPriority`] order.
//!
//! # Architecture
//!
//! - Handlers are closures owned by the dispatcher, registered with an explicit name and priority
//! - Handlers with equal priority run in registration order
//! - A handler error aborts the remaining handlers for that event and is returned to the caller
//! - Per-tower state is taken out of the runtime's table for the duration of a handler
//!   (see [`DispatchContext::with_tower`])

mod context;
mod handlers;
mod registry;

pub use context::DispatchContext;
pub use handlers::register_default_handlers;
pub use registry::{EventDispatcher, EventHandler};

/// Delivery order of handlers for the same event kind.
///
/// Lower variants run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventPriority {
    /// Runs before any gameplay reaction, e.g. restoring structure on load.
    Critical,
    High,
    #[default]
    Normal,
    /// Observers that must see the outcome of every other handler.
    Low,
}
