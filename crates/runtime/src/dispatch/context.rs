//! Execution context handed to dispatch handlers.

use std::collections::HashMap;

use tower_core::{
    ActionScheduler, EffectRegistry, EntityId, SystemContext, TowerLifecycleManager, TowerState,
};

use crate::world::InMemoryWorld;

/// Mutable runtime services available to a handler.
///
/// Borrowed from the [`Runtime`](crate::Runtime) for a single dispatch.
pub struct DispatchContext<'a> {
    pub scheduler: &'a mut ActionScheduler,
    pub world: &'a mut InMemoryWorld,
    pub effects: &'a EffectRegistry,
    pub lifecycle: &'a TowerLifecycleManager,
    pub towers: &'a mut HashMap<EntityId, TowerState>,
}

impl DispatchContext<'_> {
    /// Core context over the same scheduler, world and registry.
    pub fn system(&mut self) -> SystemContext<'_> {
        SystemContext::new(&mut *self.scheduler, &mut *self.world, self.effects)
    }

    /// Runs `f` with the state record of `tower` taken out of the table.
    ///
    /// The record is written back after `f` returns. Returns `None` without
    /// calling `f` if `tower` has no record.
    pub fn with_tower<R>(
        &mut self,
        tower: EntityId,
        f: impl FnOnce(&TowerLifecycleManager, &mut TowerState, &mut SystemContext<'_>) -> R,
    ) -> Option<R> {
        let mut state = self.towers.remove(&tower)?;
        let lifecycle = self.lifecycle;
        let mut ctx = SystemContext::new(&mut *self.scheduler, &mut *self.world, self.effects);
        let result = f(lifecycle, &mut state, &mut ctx);
        self.towers.insert(tower, state);
        Some(result)
    }

    /// Moves a tower record to a new entity, e.g. from a block to its item.
    pub fn move_tower(&mut self, from: EntityId, to: EntityId) -> bool {
        match self.towers.remove(&from) {
            Some(state) => {
                self.towers.insert(to, state);
                true
            }
            None => false,
        }
    }
}
