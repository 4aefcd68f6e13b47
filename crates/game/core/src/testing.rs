//! In-crate test double for the host world.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::effect::EffectKind;
use crate::env::{CueSink, DamageSink, EntityManager, Prefab, PrefabResolver, TargetSource};
use crate::state::{EntityId, Vec3};

#[derive(Debug, Default)]
pub(crate) struct MockWorld {
    next_id: u64,
    alive: BTreeSet<EntityId>,
    positions: HashMap<EntityId, Vec3>,
    effectors: HashMap<EntityId, EffectKind>,
    targets: BTreeSet<EntityId>,
    prefabs: HashMap<String, Prefab>,
    pub children: BTreeMap<EntityId, (EntityId, Vec3)>,
    pub created: Vec<EntityId>,
    pub destroyed: Vec<EntityId>,
    damage: Vec<(EntityId, u32)>,
    cues: Vec<(EntityId, String, bool)>,
}

impl MockWorld {
    pub fn new() -> Self {
        let mut world = Self::default();
        world.add_prefab(Prefab::new("Towers:testRook"));
        world
    }

    pub fn add_prefab(&mut self, prefab: Prefab) {
        self.prefabs.insert(prefab.name.clone(), prefab);
    }

    pub fn remove_prefab(&mut self, name: &str) {
        self.prefabs.remove(name);
    }

    pub fn spawn(&mut self, position: Vec3) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.alive.insert(id);
        self.positions.insert(id, position);
        id
    }

    pub fn spawn_target(&mut self, position: Vec3) -> EntityId {
        let id = self.spawn(position);
        self.targets.insert(id);
        id
    }

    pub fn spawn_effector(&mut self, kind: EffectKind) -> EntityId {
        let id = self.spawn(Vec3::ZERO);
        self.effectors.insert(id, kind);
        id
    }

    pub fn place(&mut self, entity: EntityId, position: Vec3) {
        self.positions.insert(entity, position);
    }

    pub fn kill(&mut self, entity: EntityId) {
        self.alive.remove(&entity);
    }

    pub fn damage_to(&self, target: EntityId) -> u32 {
        self.hits_on(target).iter().sum()
    }

    pub fn hits_on(&self, target: EntityId) -> Vec<u32> {
        self.damage
            .iter()
            .filter(|(id, _)| *id == target)
            .map(|(_, amount)| *amount)
            .collect()
    }

    pub fn cues_begun(&self, target: EntityId, cue: &str) -> usize {
        self.count_cues(target, cue, true)
    }

    pub fn cues_ended(&self, target: EntityId, cue: &str) -> usize {
        self.count_cues(target, cue, false)
    }

    fn count_cues(&self, target: EntityId, cue: &str, begin: bool) -> usize {
        self.cues
            .iter()
            .filter(|(id, name, b)| *id == target && name == cue && *b == begin)
            .count()
    }
}

impl EntityManager for MockWorld {
    fn create_from_prefab(&mut self, _prefab: &Prefab, _owner: EntityId) -> EntityId {
        let id = self.spawn(Vec3::ZERO);
        self.created.push(id);
        id
    }

    fn attach_child(&mut self, parent: EntityId, child: EntityId, offset: Vec3) {
        self.children.insert(child, (parent, offset));
    }

    fn destroy(&mut self, entity: EntityId) {
        if entity.is_null() {
            return;
        }
        if self.alive.remove(&entity) {
            self.children.remove(&entity);
            self.destroyed.push(entity);
        }
    }

    fn exists(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    fn world_position(&self, entity: EntityId) -> Option<Vec3> {
        if !self.exists(entity) {
            return None;
        }
        self.positions.get(&entity).copied()
    }

    fn effector_kind(&self, entity: EntityId) -> Option<EffectKind> {
        self.effectors.get(&entity).copied()
    }
}

impl PrefabResolver for MockWorld {
    fn resolve_prefab(&self, name: &str) -> Option<Prefab> {
        self.prefabs.get(name).cloned()
    }
}

impl TargetSource for MockWorld {
    fn alive_targets(&self) -> Vec<(EntityId, Vec3)> {
        self.targets
            .iter()
            .filter(|id| self.alive.contains(*id))
            .filter_map(|id| self.positions.get(id).map(|pos| (*id, *pos)))
            .collect()
    }
}

impl DamageSink for MockWorld {
    fn deliver_damage(&mut self, target: EntityId, amount: u32) {
        self.damage.push((target, amount));
    }
}

impl CueSink for MockWorld {
    fn begin_cue(&mut self, target: EntityId, cue: &str) {
        self.cues.push((target, cue.to_string(), true));
    }

    fn end_cue(&mut self, target: EntityId, cue: &str) {
        self.cues.push((target, cue.to_string(), false));
    }
}
