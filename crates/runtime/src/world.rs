//! In-memory host world backing the core's collaborator traits.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;
use tower_core::{
    CueSink, DamageSink, EffectKind, EntityId, EntityManager, Prefab, PrefabResolver,
    TargetSource, Tick, Vec3,
};

/// What an entity is to the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityRole {
    Tower,
    /// A tower picked up into an inventory.
    TowerItem,
    Enemy,
    Effector(EffectKind),
    /// Spawned from a prefab, e.g. a turret.
    Attachment,
}

#[derive(Clone, Debug)]
struct EntityRecord {
    role: EntityRole,
    position: Vec3,
    /// Parent and local offset; the world position follows the parent.
    parent: Option<(EntityId, Vec3)>,
    prefab: Option<String>,
}

/// A single damage delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRecord {
    pub at: Tick,
    pub target: EntityId,
    pub amount: u32,
}

/// Entity store, prefab catalog, damage log and cue counter.
///
/// Cues are reference-counted per (entity, name): two overlapping stacks of
/// the same effect keep the cue alive until both have ended.
#[derive(Debug, Default)]
pub struct InMemoryWorld {
    next_id: u64,
    now: Tick,
    entities: BTreeMap<EntityId, EntityRecord>,
    prefabs: HashMap<String, Prefab>,
    damage: Vec<DamageRecord>,
    cues: HashMap<(EntityId, String), u32>,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefabs(prefabs: impl IntoIterator<Item = Prefab>) -> Self {
        let mut world = Self::new();
        for prefab in prefabs {
            world.register_prefab(prefab);
        }
        world
    }

    pub fn register_prefab(&mut self, prefab: Prefab) {
        self.prefabs.insert(prefab.name.clone(), prefab);
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub(crate) fn set_now(&mut self, now: Tick) {
        self.now = now;
    }

    pub fn spawn(&mut self, role: EntityRole, position: Vec3) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.insert(
            id,
            EntityRecord {
                role,
                position,
                parent: None,
                prefab: None,
            },
        );
        id
    }

    pub fn role(&self, entity: EntityId) -> Option<EntityRole> {
        self.entities.get(&entity).map(|record| record.role)
    }

    pub fn parent(&self, entity: EntityId) -> Option<(EntityId, Vec3)> {
        self.entities.get(&entity).and_then(|record| record.parent)
    }

    pub fn prefab_of(&self, entity: EntityId) -> Option<&str> {
        self.entities
            .get(&entity)
            .and_then(|record| record.prefab.as_deref())
    }

    /// Entities parented to `entity`, in id order.
    pub fn children_of(&self, entity: EntityId) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, record)| record.parent.is_some_and(|(parent, _)| parent == entity))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Moves an entity; returns false if it does not exist.
    pub fn set_position(&mut self, entity: EntityId, position: Vec3) -> bool {
        match self.entities.get_mut(&entity) {
            Some(record) => {
                record.position = position;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn damage_log(&self) -> &[DamageRecord] {
        &self.damage
    }

    pub fn hits_on(&self, target: EntityId) -> Vec<u32> {
        self.damage
            .iter()
            .filter(|record| record.target == target)
            .map(|record| record.amount)
            .collect()
    }

    pub fn damage_to(&self, target: EntityId) -> u64 {
        self.damage
            .iter()
            .filter(|record| record.target == target)
            .map(|record| u64::from(record.amount))
            .sum()
    }

    pub fn cue_active(&self, entity: EntityId, cue: &str) -> bool {
        self.cues.contains_key(&(entity, cue.to_string()))
    }
}

impl EntityManager for InMemoryWorld {
    fn create_from_prefab(&mut self, prefab: &Prefab, owner: EntityId) -> EntityId {
        let position = self.world_position(owner).unwrap_or(Vec3::ZERO);
        let id = self.spawn(EntityRole::Attachment, position);
        if let Some(record) = self.entities.get_mut(&id) {
            record.prefab = Some(prefab.name.clone());
        }
        trace!(
            target: "tower_runtime::world",
            entity = %id,
            owner = %owner,
            prefab = %prefab.name,
            "created entity from prefab"
        );
        id
    }

    fn attach_child(&mut self, parent: EntityId, child: EntityId, offset: Vec3) {
        if let Some(record) = self.entities.get_mut(&child) {
            record.parent = Some((parent, offset));
        }
    }

    fn destroy(&mut self, entity: EntityId) {
        if entity.is_null() || self.entities.remove(&entity).is_none() {
            return;
        }
        self.cues.retain(|(owner, _), _| *owner != entity);
        trace!(target: "tower_runtime::world", entity = %entity, "destroyed entity");
    }

    fn exists(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    fn world_position(&self, entity: EntityId) -> Option<Vec3> {
        let record = self.entities.get(&entity)?;
        match record.parent {
            Some((parent, offset)) => self
                .world_position(parent)
                .map(|origin| origin + offset)
                .or(Some(record.position)),
            None => Some(record.position),
        }
    }

    fn effector_kind(&self, entity: EntityId) -> Option<EffectKind> {
        match self.role(entity)? {
            EntityRole::Effector(kind) => Some(kind),
            _ => None,
        }
    }
}

impl PrefabResolver for InMemoryWorld {
    fn resolve_prefab(&self, name: &str) -> Option<Prefab> {
        self.prefabs.get(name).cloned()
    }
}

impl TargetSource for InMemoryWorld {
    fn alive_targets(&self) -> Vec<(EntityId, Vec3)> {
        self.entities
            .iter()
            .filter(|(_, record)| record.role == EntityRole::Enemy)
            .filter_map(|(id, _)| self.world_position(*id).map(|pos| (*id, pos)))
            .collect()
    }
}

impl DamageSink for InMemoryWorld {
    fn deliver_damage(&mut self, target: EntityId, amount: u32) {
        trace!(
            target: "tower_runtime::world",
            target_entity = %target,
            amount,
            at = %self.now,
            "damage delivered"
        );
        self.damage.push(DamageRecord {
            at: self.now,
            target,
            amount,
        });
    }
}

impl CueSink for InMemoryWorld {
    fn begin_cue(&mut self, target: EntityId, cue: &str) {
        *self.cues.entry((target, cue.to_string())).or_insert(0) += 1;
    }

    fn end_cue(&mut self, target: EntityId, cue: &str) {
        let key = (target, cue.to_string());
        if let Some(count) = self.cues.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.cues.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachments_follow_their_parent() {
        let mut world = InMemoryWorld::with_prefabs([Prefab::new("Towers:testRook")]);
        let tower = world.spawn(EntityRole::Tower, Vec3::new(3.0, 0.0, 0.0));
        let prefab = world.resolve_prefab("Towers:testRook").unwrap();
        let turret = world.create_from_prefab(&prefab, tower);
        world.attach_child(tower, turret, Vec3::new(0.0, 1.0, 0.0));

        world.set_position(tower, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(world.world_position(turret), Some(Vec3::new(4.0, 1.0, 0.0)));
        assert_eq!(world.children_of(tower), vec![turret]);
        assert_eq!(world.prefab_of(turret), Some("Towers:testRook"));
    }

    #[test]
    fn only_enemies_are_targets() {
        let mut world = InMemoryWorld::new();
        world.spawn(EntityRole::Tower, Vec3::ZERO);
        let enemy = world.spawn(EntityRole::Enemy, Vec3::new(1.0, 0.0, 0.0));
        world.spawn(EntityRole::Effector(EffectKind::Poison), Vec3::ZERO);

        assert_eq!(world.alive_targets(), vec![(enemy, Vec3::new(1.0, 0.0, 0.0))]);
    }

    #[test]
    fn cues_are_reference_counted() {
        let mut world = InMemoryWorld::new();
        let enemy = world.spawn(EntityRole::Enemy, Vec3::ZERO);

        world.begin_cue(enemy, "glow");
        world.begin_cue(enemy, "glow");
        world.end_cue(enemy, "glow");
        assert!(world.cue_active(enemy, "glow"));
        world.end_cue(enemy, "glow");
        assert!(!world.cue_active(enemy, "glow"));
        // Unbalanced ends are ignored.
        world.end_cue(enemy, "glow");
        assert!(!world.cue_active(enemy, "glow"));
    }

    #[test]
    fn destroy_is_idempotent_and_ignores_null() {
        let mut world = InMemoryWorld::new();
        let enemy = world.spawn(EntityRole::Enemy, Vec3::ZERO);
        world.begin_cue(enemy, "glow");

        world.destroy(EntityId::NULL);
        world.destroy(enemy);
        world.destroy(enemy);

        assert!(!world.exists(enemy));
        assert!(!world.cue_active(enemy, "glow"));
        assert!(world.is_empty());
    }
}
