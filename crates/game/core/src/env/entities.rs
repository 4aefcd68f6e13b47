//! Entity lifecycle and component access.

use crate::effect::EffectKind;
use crate::env::Prefab;
use crate::state::{EntityId, Vec3};

/// Entity lifecycle operations and component queries provided by the host.
pub trait EntityManager {
    /// Creates an entity from `prefab`, owned by `owner`.
    fn create_from_prefab(&mut self, prefab: &Prefab, owner: EntityId) -> EntityId;

    /// Parents `child` to `parent` at a local offset.
    fn attach_child(&mut self, parent: EntityId, child: EntityId, offset: Vec3);

    /// Destroys an entity. Destroying the null entity or a missing one is a no-op.
    fn destroy(&mut self, entity: EntityId);

    /// Returns true if the entity is alive.
    fn exists(&self, entity: EntityId) -> bool;

    /// World-space position of the entity, if it has one.
    fn world_position(&self, entity: EntityId) -> Option<Vec3>;

    /// Effect kind of the entity's effector component, if it has one.
    fn effector_kind(&self, entity: EntityId) -> Option<EffectKind>;
}

/// Enumerates the live targets towers may attack.
pub trait TargetSource {
    fn alive_targets(&self) -> Vec<(EntityId, Vec3)>;
}
