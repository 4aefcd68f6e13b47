//! High-level runtime orchestrator.
//!
//! The runtime owns the world, the scheduler and every tower record, and
//! drives simulated time forward by draining due timers one at a time through
//! the [`EventDispatcher`].

use std::collections::HashMap;

use tracing::{debug, info};

use tower_content::{ContentFactory, LoadResult};
use tower_core::{
    ActionScheduler, EffectKind, EffectRegistry, EntityId, EntityManager, Prefab, TargeterState,
    Tick, TowerConfig, TowerEvent, TowerLifecycleManager, TowerState, Vec3,
};

use crate::dispatch::{DispatchContext, EventDispatcher};
use crate::error::{Result, RuntimeError};
use crate::world::{EntityRole, InMemoryWorld};

/// Parameters of a tower to build.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSpec {
    pub position: Vec3,
    pub range: f32,
    /// Scan period; the configured default when `None`.
    pub attack_speed_ms: Option<u64>,
    pub multiplier: f32,
    pub activated: bool,
    /// One effector entity is spawned per entry.
    pub effectors: Vec<EffectKind>,
}

impl TowerSpec {
    pub fn new(position: Vec3, range: f32) -> Self {
        Self {
            position,
            range,
            attack_speed_ms: None,
            multiplier: 1.0,
            activated: true,
            effectors: Vec::new(),
        }
    }

    pub fn activated(mut self, activated: bool) -> Self {
        self.activated = activated;
        self
    }

    pub fn attack_speed_ms(mut self, attack_speed_ms: u64) -> Self {
        self.attack_speed_ms = Some(attack_speed_ms);
        self
    }

    pub fn multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn effector(mut self, kind: EffectKind) -> Self {
        self.effectors.push(kind);
        self
    }
}

/// Single-threaded tower simulation host.
pub struct Runtime {
    scheduler: ActionScheduler,
    world: InMemoryWorld,
    effects: EffectRegistry,
    lifecycle: TowerLifecycleManager,
    towers: HashMap<EntityId, TowerState>,
    dispatcher: EventDispatcher,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn now(&self) -> Tick {
        self.scheduler.now()
    }

    pub fn world(&self) -> &InMemoryWorld {
        &self.world
    }

    pub fn scheduler(&self) -> &ActionScheduler {
        &self.scheduler
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    pub fn config(&self) -> &TowerConfig {
        self.lifecycle.config()
    }

    /// State record of a tower, block or tower item.
    pub fn tower(&self, entity: EntityId) -> Option<&TowerState> {
        self.towers.get(&entity)
    }

    /// Builds a tower and delivers its "component activated" event.
    ///
    /// An activated tower spawns its turret and arms its scan immediately.
    pub fn spawn_tower(&mut self, spec: TowerSpec) -> Result<EntityId> {
        let attack_speed = spec
            .attack_speed_ms
            .unwrap_or(self.config().scan_period_ms);
        let targeter = TargeterState::new(spec.range, attack_speed)?.with_multiplier(spec.multiplier)?;

        let tower = self.world.spawn(EntityRole::Tower, spec.position);
        let effectors: Vec<_> = spec
            .effectors
            .iter()
            .map(|&kind| {
                let effector = self.world.spawn(EntityRole::Effector(kind), spec.position);
                self.world.attach_child(tower, effector, Vec3::ZERO);
                effector
            })
            .collect();

        let state = TowerState::new(targeter)
            .activated(spec.activated)
            .with_effectors(effectors);
        self.towers.insert(tower, state);
        info!(
            target: "tower_runtime::dispatch",
            tower = %tower,
            range = spec.range,
            attack_speed_ms = attack_speed,
            "tower built"
        );

        self.dispatch(TowerEvent::ComponentActivated { tower })?;
        Ok(tower)
    }

    pub fn spawn_enemy(&mut self, position: Vec3) -> EntityId {
        self.world.spawn(EntityRole::Enemy, position)
    }

    pub fn move_entity(&mut self, entity: EntityId, position: Vec3) -> Result<()> {
        if self.world.set_position(entity, position) {
            Ok(())
        } else {
            Err(RuntimeError::UnknownEntity(entity))
        }
    }

    /// Delivers an explicit activation toggle.
    pub fn request_activation(&mut self, tower: EntityId, activated: bool) -> Result<()> {
        if !self.towers.contains_key(&tower) || self.world.role(tower) != Some(EntityRole::Tower) {
            return Err(RuntimeError::NotATower(tower));
        }
        self.dispatch(TowerEvent::ActivationRequested { tower, activated })
    }

    /// Converts a tower block into an item, keeping its state record.
    ///
    /// The block entity is destroyed; the returned item carries the record.
    pub fn pick_up(&mut self, block: EntityId) -> Result<EntityId> {
        if self.world.role(block) != Some(EntityRole::Tower) {
            return Err(RuntimeError::NotATower(block));
        }
        let position = self.world.world_position(block).unwrap_or(Vec3::ZERO);
        let item = self.world.spawn(EntityRole::TowerItem, position);
        self.dispatch(TowerEvent::BlockToItem { block, item })?;
        self.reparent_children(block, item);
        self.destroy(block)?;
        Ok(item)
    }

    /// Places a tower item back into the world as a new tower block.
    pub fn place(&mut self, item: EntityId, position: Vec3) -> Result<EntityId> {
        if self.world.role(item) != Some(EntityRole::TowerItem) {
            return Err(RuntimeError::NotAnItem(item));
        }
        let placed = self.world.spawn(EntityRole::Tower, position);
        self.reparent_children(item, placed);
        self.dispatch(TowerEvent::ItemPlaced { item, placed })?;
        self.destroy(item)?;
        Ok(placed)
    }

    /// Destroys an entity and everything parented to it.
    ///
    /// Handlers see the `Destroyed` event while the entity still exists; every
    /// timer it owned is cancelled before it is removed from the world.
    pub fn destroy(&mut self, entity: EntityId) -> Result<()> {
        if !self.world.exists(entity) {
            return Err(RuntimeError::UnknownEntity(entity));
        }
        self.dispatch(TowerEvent::Destroyed { entity })?;
        for child in self.world.children_of(entity) {
            self.destroy(child)?;
        }
        let cancelled = self.scheduler.cancel_owner(entity);
        self.world.destroy(entity);
        debug!(
            target: "tower_runtime::dispatch",
            entity = %entity,
            cancelled,
            "entity destroyed"
        );
        Ok(())
    }

    /// Advances simulated time by `ms`, firing every timer due on the way.
    ///
    /// Firings whose owner no longer exists are dropped.
    pub fn advance(&mut self, ms: u64) -> Result<()> {
        let until = self.now() + ms;
        while let Some(fired) = self.scheduler.pop_due(until) {
            if !self.world.exists(fired.owner) {
                self.scheduler.cancel_owner(fired.owner);
                debug!(
                    target: "tower_runtime::dispatch",
                    action = %fired.key(),
                    "dropping firing for missing owner"
                );
                continue;
            }
            self.world.set_now(fired.at);
            self.dispatch(TowerEvent::from(fired))?;
        }
        self.scheduler.advance_to(until);
        self.world.set_now(until);
        Ok(())
    }

    /// Delivers `event` through the dispatcher.
    pub fn dispatch(&mut self, event: TowerEvent) -> Result<()> {
        let mut ctx = DispatchContext {
            scheduler: &mut self.scheduler,
            world: &mut self.world,
            effects: &self.effects,
            lifecycle: &self.lifecycle,
            towers: &mut self.towers,
        };
        self.dispatcher.dispatch(&event, &mut ctx)
    }

    /// Moves effector children from `from` to `to`; the turret is not moved.
    fn reparent_children(&mut self, from: EntityId, to: EntityId) {
        for child in self.world.children_of(from) {
            if matches!(self.world.role(child), Some(EntityRole::Effector(_))) {
                self.world.attach_child(to, child, Vec3::ZERO);
            }
        }
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: TowerConfig,
    effects: Option<EffectRegistry>,
    prefabs: Vec<Prefab>,
    dispatcher: Option<EventDispatcher>,
    start: Tick,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: TowerConfig::default(),
            effects: None,
            prefabs: Vec::new(),
            dispatcher: None,
            start: Tick::ZERO,
        }
    }

    /// Loads configuration, effects and prefabs from a content directory.
    pub fn from_content(factory: &ContentFactory) -> LoadResult<Self> {
        Ok(Self::new()
            .config(factory.load_config()?)
            .effects(factory.load_effects()?)
            .prefabs(factory.load_prefabs()?))
    }

    /// Override tower configuration
    pub fn config(mut self, config: TowerConfig) -> Self {
        self.config = config;
        self
    }

    /// Effect definitions; [`EffectRegistry::builtin`] if not set.
    pub fn effects(mut self, effects: EffectRegistry) -> Self {
        self.effects = Some(effects);
        self
    }

    /// Prefab catalog; only the configured turret prefab if empty.
    pub fn prefabs(mut self, prefabs: impl IntoIterator<Item = Prefab>) -> Self {
        self.prefabs.extend(prefabs);
        self
    }

    /// Replace the default dispatcher.
    pub fn with_dispatcher(mut self, dispatcher: EventDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn starting_at(mut self, start: Tick) -> Self {
        self.start = start;
        self
    }

    /// Validates the configuration and builds the runtime.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::Config`] if the configuration is invalid
    /// - [`RuntimeError::Effect`] if the default effect is not registered
    pub fn build(self) -> Result<Runtime> {
        self.config.validate()?;
        let effects = self.effects.unwrap_or_else(EffectRegistry::builtin);
        effects.require(self.config.default_effect)?;

        let mut world = if self.prefabs.is_empty() {
            InMemoryWorld::with_prefabs([Prefab::new(self.config.turret_prefab.clone())])
        } else {
            InMemoryWorld::with_prefabs(self.prefabs)
        };
        world.set_now(self.start);

        Ok(Runtime {
            scheduler: ActionScheduler::starting_at(self.start),
            world,
            effects,
            lifecycle: TowerLifecycleManager::new(self.config),
            towers: HashMap::new(),
            dispatcher: self
                .dispatcher
                .unwrap_or_else(EventDispatcher::with_default_handlers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_core::{ActionId, EffectError};

    #[test]
    fn activated_tower_arms_scan_on_build() {
        let mut runtime = Runtime::builder().build().unwrap();
        let tower = runtime
            .spawn_tower(TowerSpec::new(Vec3::ZERO, 5.0).attack_speed_ms(250))
            .unwrap();

        let state = runtime.tower(tower).unwrap();
        assert!(state.has_child());
        assert_eq!(
            runtime.scheduler().remaining_ms(tower, ActionId::scan(tower)),
            Some(250)
        );
        assert_eq!(
            runtime.world().world_position(state.child),
            Some(Vec3::new(0.0, 1.0, 0.0))
        );
    }

    #[test]
    fn inactive_tower_waits_for_request() {
        let mut runtime = Runtime::builder().build().unwrap();
        let tower = runtime
            .spawn_tower(TowerSpec::new(Vec3::ZERO, 5.0).activated(false))
            .unwrap();
        assert!(runtime.scheduler().is_empty());

        runtime.request_activation(tower, true).unwrap();
        assert!(runtime.tower(tower).unwrap().has_child());
    }

    #[test]
    fn requests_for_non_towers_are_rejected() {
        let mut runtime = Runtime::builder().build().unwrap();
        let enemy = runtime.spawn_enemy(Vec3::ZERO);

        assert!(matches!(
            runtime.request_activation(enemy, true),
            Err(RuntimeError::NotATower(id)) if id == enemy
        ));
        assert!(matches!(
            runtime.place(enemy, Vec3::ZERO),
            Err(RuntimeError::NotAnItem(_))
        ));
    }

    #[test]
    fn build_rejects_unregistered_default_effect() {
        let err = Runtime::builder()
            .effects(EffectRegistry::new())
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RuntimeError::Effect(EffectError::UnknownEffect(EffectKind::DamageOverTime))
        ));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let config = TowerConfig {
            scan_period_ms: 0,
            ..TowerConfig::default()
        };
        assert!(matches!(
            Runtime::builder().config(config).build(),
            Err(RuntimeError::Config(_))
        ));
    }

    #[test]
    fn advance_moves_the_clock_without_timers() {
        let mut runtime = Runtime::builder().starting_at(Tick(500)).build().unwrap();
        runtime.advance(1500).unwrap();
        assert_eq!(runtime.now(), Tick(2000));
        assert_eq!(runtime.world().now(), Tick(2000));
    }
}
