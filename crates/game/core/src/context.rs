//! Execution context handed to every handler.

use crate::effect::EffectRegistry;
use crate::env::World;
use crate::scheduler::ActionScheduler;

/// Mutable services a handler may use while it runs.
///
/// Handlers run one at a time to completion, so exclusive borrows of the
/// scheduler and world are enough; no locking is involved.
pub struct SystemContext<'a> {
    pub scheduler: &'a mut ActionScheduler,
    pub world: &'a mut dyn World,
    pub effects: &'a EffectRegistry,
}

impl<'a> SystemContext<'a> {
    pub fn new(
        scheduler: &'a mut ActionScheduler,
        world: &'a mut dyn World,
        effects: &'a EffectRegistry,
    ) -> Self {
        Self {
            scheduler,
            world,
            effects,
        }
    }
}
