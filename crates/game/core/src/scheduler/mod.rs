//! Keyed timer service for one-shot and periodic actions.
//!
//! Every timer is addressed by an [`ActionKey`]: the owning entity plus a
//! structured [`ActionId`]. The scheduler only keeps timing data; it never
//! keeps an entity alive, and hosts cancel an owner's timers when they destroy
//! it.
//!
//! # Firing
//!
//! Hosts drain due timers one at a time with [`ActionScheduler::pop_due`] so
//! that a handler's cancellations and registrations are visible to the next
//! firing in the same window. Timers due at the same tick fire in
//! registration order.
mod error;
mod key;
mod queue;

pub use error::SchedulerError;
pub use key::{ActionId, ActionIdParseError, ActionKey, ActionPurpose};
pub use queue::{ActionKind, ActionScheduler, FiredAction};
