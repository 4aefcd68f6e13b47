//! Per-tower activation state machine and periodic scanning.
//!
//! A tower is `Active` while it holds a turret attachment and a scan timer,
//! `Inactive` otherwise. Every handler here is idempotent: repeating an
//! activation never spawns a second attachment or arms a second scan, and
//! deactivating an inactive tower does nothing.
mod error;

pub use error::LifecycleError;

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::TowerConfig;
use crate::context::SystemContext;
use crate::effect::{EffectApplier, EffectCount, EffectError, EffectKind};
use crate::scheduler::ActionId;
use crate::state::{EntityId, TowerState};
use crate::targeting::TargetSelector;

/// Structural outcome of a lifecycle handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Inactive to Active: attachment spawned and scan armed.
    Activated,
    /// Active to Inactive: attachment destroyed and scan cancelled.
    Deactivated,
    Unchanged,
}

/// Result of one scan tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Targets in range on this scan.
    pub targets: BTreeSet<EntityId>,
    /// Number of effect applications performed.
    pub applications: usize,
}

/// Drives tower activation, deactivation and scanning.
#[derive(Clone, Debug)]
pub struct TowerLifecycleManager {
    config: TowerConfig,
    applier: EffectApplier,
}

impl TowerLifecycleManager {
    pub fn new(config: TowerConfig) -> Self {
        Self {
            config,
            applier: EffectApplier::new(),
        }
    }

    pub fn config(&self) -> &TowerConfig {
        &self.config
    }

    pub fn applier(&self) -> &EffectApplier {
        &self.applier
    }

    /// Id of the periodic scan a tower registers on itself.
    pub fn scan_action(tower: EntityId) -> ActionId {
        ActionId::scan(tower)
    }

    /// Handles an explicit activation toggle.
    ///
    /// `is_activated` is always stored, even when no transition happens.
    pub fn handle_toggle(
        &self,
        tower: EntityId,
        state: &mut TowerState,
        desired: bool,
        ctx: &mut SystemContext<'_>,
    ) -> Result<Transition, LifecycleError> {
        state.is_activated = desired;
        if desired {
            if state.has_child() {
                return Ok(Transition::Unchanged);
            }
            self.activate(tower, state, ctx)
        } else {
            Ok(self.deactivate(tower, state, ctx))
        }
    }

    /// Handles a tower item placed back into the world as `placed`.
    pub fn on_item_placed(
        &self,
        placed: EntityId,
        state: &mut TowerState,
        ctx: &mut SystemContext<'_>,
    ) -> Result<Transition, LifecycleError> {
        self.resume(placed, state, ctx)
    }

    /// Handles the tower component becoming active, e.g. on world load.
    pub fn on_component_activated(
        &self,
        tower: EntityId,
        state: &mut TowerState,
        ctx: &mut SystemContext<'_>,
    ) -> Result<Transition, LifecycleError> {
        self.resume(tower, state, ctx)
    }

    /// Handles a tower block being converted into an item.
    ///
    /// `is_activated` is kept so the tower resumes when placed again.
    pub fn on_block_to_item(
        &self,
        block: EntityId,
        state: &mut TowerState,
        ctx: &mut SystemContext<'_>,
    ) -> Transition {
        self.deactivate(block, state, ctx)
    }

    /// Handles the tower about to be destroyed.
    pub fn on_destroyed(
        &self,
        tower: EntityId,
        state: &mut TowerState,
        ctx: &mut SystemContext<'_>,
    ) -> Transition {
        self.deactivate(tower, state, ctx)
    }

    /// Handles a periodic firing owned by `tower`.
    ///
    /// Returns `Ok(None)` if `id` is not this tower's scan, or if the tower
    /// has no world position any more.
    ///
    /// # Errors
    ///
    /// - [`EffectError::MissingEffector`] if a listed live effector has no effector component
    /// - [`EffectError::UnknownEffect`] if an effector's kind is not registered
    pub fn on_periodic(
        &self,
        tower: EntityId,
        state: &mut TowerState,
        id: ActionId,
        ctx: &mut SystemContext<'_>,
    ) -> Result<Option<ScanReport>, LifecycleError> {
        if id != Self::scan_action(tower) {
            return Ok(None);
        }
        let Some(origin) = ctx.world.world_position(tower) else {
            debug!(
                target: "tower_core::lifecycle",
                tower = %tower,
                "dropping scan for tower without position"
            );
            return Ok(None);
        };

        let sources = self.sources(tower, state, ctx)?;
        let targets = TargetSelector::select(origin, state.range(), ctx.world.alive_targets());
        let previous = state.targeter.record_hits(targets.clone());
        let multiplier = state.targeter.multiplier;
        let effects = ctx.effects;

        let mut applications = 0;
        for (effector, kind) in sources {
            let definition = effects.require(kind)?;
            match definition.count {
                EffectCount::PerShot => {
                    for &target in &targets {
                        self.applier.apply(effector, target, kind, multiplier, ctx)?;
                        applications += 1;
                    }
                }
                EffectCount::Continuous => {
                    for &target in targets.difference(&previous) {
                        self.applier.apply(effector, target, kind, multiplier, ctx)?;
                        applications += 1;
                    }
                    for &target in previous.difference(&targets) {
                        self.applier.remove(effector, target, kind, ctx);
                    }
                }
            }
        }

        debug!(
            target: "tower_core::lifecycle",
            tower = %tower,
            targets = targets.len(),
            applications,
            "scan complete"
        );
        Ok(Some(ScanReport {
            targets,
            applications,
        }))
    }

    fn resume(
        &self,
        tower: EntityId,
        state: &mut TowerState,
        ctx: &mut SystemContext<'_>,
    ) -> Result<Transition, LifecycleError> {
        if state.is_activated && !state.has_child() {
            self.activate(tower, state, ctx)
        } else {
            Ok(Transition::Unchanged)
        }
    }

    /// Spawns the turret attachment and arms the scan if it is not armed yet.
    fn activate(
        &self,
        tower: EntityId,
        state: &mut TowerState,
        ctx: &mut SystemContext<'_>,
    ) -> Result<Transition, LifecycleError> {
        let prefab = ctx
            .world
            .resolve_prefab(&self.config.turret_prefab)
            .ok_or_else(|| LifecycleError::PrefabNotFound(self.config.turret_prefab.clone()))?;

        let child = ctx.world.create_from_prefab(&prefab, tower);
        ctx.world
            .attach_child(tower, child, self.config.turret_offset);
        state.child = child;

        let scan = Self::scan_action(tower);
        if !ctx.scheduler.has_periodic(tower, scan) {
            let period = state.targeter.attack_speed_ms;
            ctx.scheduler.schedule_periodic(tower, scan, period, period)?;
        }

        info!(
            target: "tower_core::lifecycle",
            tower = %tower,
            child = %child,
            "tower activated"
        );
        Ok(Transition::Activated)
    }

    /// Destroys the attachment, cancels the scan and releases continuous effects.
    fn deactivate(
        &self,
        tower: EntityId,
        state: &mut TowerState,
        ctx: &mut SystemContext<'_>,
    ) -> Transition {
        let had_child = state.has_child();
        if had_child {
            ctx.world.destroy(state.child);
            state.child = EntityId::NULL;
        }
        let cancelled = ctx.scheduler.cancel(tower, Self::scan_action(tower));
        self.release(tower, state, ctx);

        if had_child || cancelled {
            info!(
                target: "tower_core::lifecycle",
                tower = %tower,
                "tower deactivated"
            );
            Transition::Deactivated
        } else {
            Transition::Unchanged
        }
    }

    /// Removes continuous effects from last scan's targets and forgets them.
    fn release(&self, tower: EntityId, state: &mut TowerState, ctx: &mut SystemContext<'_>) {
        let affected = std::mem::take(&mut state.targeter.affected_enemies);
        if affected.is_empty() {
            return;
        }
        let effects = ctx.effects;
        let continuous: Vec<_> = self
            .known_sources(tower, state, ctx)
            .into_iter()
            .filter(|(_, kind)| {
                effects
                    .get(*kind)
                    .is_some_and(|d| d.count == EffectCount::Continuous)
            })
            .collect();
        for (effector, kind) in continuous {
            for &target in &affected {
                self.applier.remove(effector, target, kind, ctx);
            }
        }
    }

    /// Resolves the (effector, kind) pairs a tower applies.
    ///
    /// A tower without effectors applies the configured default effect itself.
    /// Effectors that were destroyed are skipped.
    fn sources(
        &self,
        tower: EntityId,
        state: &TowerState,
        ctx: &SystemContext<'_>,
    ) -> Result<Vec<(EntityId, EffectKind)>, EffectError> {
        if state.effectors.is_empty() {
            return Ok(vec![(tower, self.config.default_effect)]);
        }
        let mut sources = Vec::with_capacity(state.effectors.len());
        for &effector in &state.effectors {
            if !ctx.world.exists(effector) {
                debug!(
                    target: "tower_core::lifecycle",
                    tower = %tower,
                    effector = %effector,
                    "skipping destroyed effector"
                );
                continue;
            }
            let kind = ctx
                .world
                .effector_kind(effector)
                .ok_or(EffectError::MissingEffector(effector))?;
            sources.push((effector, kind));
        }
        Ok(sources)
    }

    /// Like [`Self::sources`], skipping effectors that can no longer be resolved.
    fn known_sources(
        &self,
        tower: EntityId,
        state: &TowerState,
        ctx: &SystemContext<'_>,
    ) -> Vec<(EntityId, EffectKind)> {
        if state.effectors.is_empty() {
            return vec![(tower, self.config.default_effect)];
        }
        state
            .effectors
            .iter()
            .filter_map(|&effector| ctx.world.effector_kind(effector).map(|kind| (effector, kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{EffectDefinition, EffectDuration, EffectRegistry};
    use crate::error::{CoreError, ErrorSeverity};
    use crate::scheduler::ActionScheduler;
    use crate::state::{TargeterState, Tick, Vec3};
    use crate::testing::MockWorld;

    struct Fixture {
        scheduler: ActionScheduler,
        world: MockWorld,
        effects: EffectRegistry,
        manager: TowerLifecycleManager,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scheduler: ActionScheduler::new(),
                world: MockWorld::new(),
                effects: EffectRegistry::builtin(),
                manager: TowerLifecycleManager::new(TowerConfig::default()),
            }
        }

        fn tower(&mut self, range: f32) -> (EntityId, TowerState) {
            let tower = self.world.spawn(Vec3::ZERO);
            let state = TowerState::new(TargeterState::new(range, 1000).unwrap());
            (tower, state)
        }

        fn toggle(
            &mut self,
            tower: EntityId,
            state: &mut TowerState,
            desired: bool,
        ) -> Result<Transition, LifecycleError> {
            let mut ctx = SystemContext::new(&mut self.scheduler, &mut self.world, &self.effects);
            self.manager.handle_toggle(tower, state, desired, &mut ctx)
        }

        /// Fires every timer due up to `until`, routing scans to the manager
        /// and everything else to the applier.
        fn run_until(&mut self, tower: EntityId, state: &mut TowerState, until: Tick) -> usize {
            let mut scans = 0;
            while let Some(fired) = self.scheduler.pop_due(until) {
                let mut ctx =
                    SystemContext::new(&mut self.scheduler, &mut self.world, &self.effects);
                let applier = self.manager.applier();
                if !fired.is_periodic() {
                    applier.on_delayed(fired.owner, fired.id, &mut ctx).unwrap();
                } else if fired.owner == tower {
                    let report = self
                        .manager
                        .on_periodic(tower, state, fired.id, &mut ctx)
                        .unwrap();
                    scans += usize::from(report.is_some());
                } else {
                    applier.on_periodic(fired.owner, fired.id, &mut ctx).unwrap();
                }
            }
            self.scheduler.advance_to(until);
            scans
        }
    }

    #[test]
    fn toggle_on_spawns_attachment_and_arms_scan() {
        let mut fx = Fixture::new();
        let (tower, mut state) = fx.tower(5.0);

        assert_eq!(fx.toggle(tower, &mut state, true), Ok(Transition::Activated));

        assert!(state.is_activated);
        assert!(state.has_child());
        assert_eq!(fx.world.children.get(&state.child), Some(&(tower, Vec3::new(0.0, 1.0, 0.0))));
        let scan = TowerLifecycleManager::scan_action(tower);
        assert!(fx.scheduler.has_periodic(tower, scan));
        assert_eq!(fx.scheduler.remaining_ms(tower, scan), Some(1000));
    }

    #[test]
    fn activation_is_idempotent() {
        let mut fx = Fixture::new();
        let (tower, mut state) = fx.tower(5.0);

        fx.toggle(tower, &mut state, true).unwrap();
        let child = state.child;
        assert_eq!(fx.toggle(tower, &mut state, true), Ok(Transition::Unchanged));

        let mut ctx = SystemContext::new(&mut fx.scheduler, &mut fx.world, &fx.effects);
        assert_eq!(
            fx.manager.on_component_activated(tower, &mut state, &mut ctx),
            Ok(Transition::Unchanged)
        );
        assert_eq!(
            fx.manager.on_item_placed(tower, &mut state, &mut ctx),
            Ok(Transition::Unchanged)
        );

        assert_eq!(state.child, child);
        assert_eq!(fx.world.created.len(), 1);
        assert_eq!(fx.scheduler.len(), 1);
    }

    #[test]
    fn deactivation_is_idempotent() {
        let mut fx = Fixture::new();
        let (tower, mut state) = fx.tower(5.0);
        fx.toggle(tower, &mut state, true).unwrap();
        let child = state.child;

        assert_eq!(fx.toggle(tower, &mut state, false), Ok(Transition::Deactivated));
        assert_eq!(fx.toggle(tower, &mut state, false), Ok(Transition::Unchanged));

        assert!(!state.is_activated);
        assert_eq!(state.child, EntityId::NULL);
        assert_eq!(fx.world.destroyed, vec![child]);
        assert!(fx.scheduler.is_empty());
    }

    #[test]
    fn toggle_off_on_inactive_tower_still_stores_flag() {
        let mut fx = Fixture::new();
        let (tower, state) = fx.tower(5.0);
        let mut state = state.activated(true);

        assert_eq!(fx.toggle(tower, &mut state, false), Ok(Transition::Unchanged));
        assert!(!state.is_activated);
        assert!(fx.world.destroyed.is_empty());
    }

    #[test]
    fn lifecycle_events_respect_activation_flag() {
        let mut fx = Fixture::new();
        let (tower, mut state) = fx.tower(5.0);
        let mut ctx = SystemContext::new(&mut fx.scheduler, &mut fx.world, &fx.effects);

        assert_eq!(
            fx.manager.on_component_activated(tower, &mut state, &mut ctx),
            Ok(Transition::Unchanged)
        );

        state.is_activated = true;
        assert_eq!(
            fx.manager.on_component_activated(tower, &mut state, &mut ctx),
            Ok(Transition::Activated)
        );
        assert_eq!(
            fx.manager.on_block_to_item(tower, &mut state, &mut ctx),
            Transition::Deactivated
        );
        // The flag survives the item round-trip.
        assert!(state.is_activated);
        assert_eq!(
            fx.manager.on_item_placed(tower, &mut state, &mut ctx),
            Ok(Transition::Activated)
        );
        assert_eq!(
            fx.manager.on_destroyed(tower, &mut state, &mut ctx),
            Transition::Deactivated
        );
        assert!(fx.scheduler.is_empty());
    }

    #[test]
    fn missing_prefab_fails_activation() {
        let mut fx = Fixture::new();
        fx.world.remove_prefab("Towers:testRook");
        let (tower, mut state) = fx.tower(5.0);

        let err = fx.toggle(tower, &mut state, true).unwrap_err();
        assert_eq!(err, LifecycleError::PrefabNotFound("Towers:testRook".into()));
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert!(state.is_activated);
        assert!(!state.has_child());
        assert!(fx.scheduler.is_empty());
    }

    #[test]
    fn scan_hits_targets_at_range_boundary_only() {
        let mut fx = Fixture::new();
        let (tower, mut state) = fx.tower(5.0);
        let inside = fx.world.spawn_target(Vec3::new(5.0, 0.0, 0.0));
        let outside = fx.world.spawn_target(Vec3::new(5.1, 0.0, 0.0));
        fx.toggle(tower, &mut state, true).unwrap();

        assert_eq!(fx.run_until(tower, &mut state, Tick(1000)), 1);

        assert_eq!(fx.world.hits_on(inside), vec![10]);
        assert!(fx.world.hits_on(outside).is_empty());
        assert_eq!(state.targeter.affected_enemies, [inside].into_iter().collect());
    }

    #[test]
    fn scan_ignores_foreign_action_ids() {
        let mut fx = Fixture::new();
        let (tower, mut state) = fx.tower(5.0);
        let mut ctx = SystemContext::new(&mut fx.scheduler, &mut fx.world, &fx.effects);

        let other = ActionId::scan(EntityId(99));
        assert_eq!(fx.manager.on_periodic(tower, &mut state, other, &mut ctx), Ok(None));
    }

    #[test]
    fn scan_without_tower_position_is_dropped() {
        let mut fx = Fixture::new();
        let (tower, mut state) = fx.tower(5.0);
        fx.world.spawn_target(Vec3::ZERO);
        fx.world.kill(tower);
        let mut ctx = SystemContext::new(&mut fx.scheduler, &mut fx.world, &fx.effects);

        let scan = TowerLifecycleManager::scan_action(tower);
        assert_eq!(fx.manager.on_periodic(tower, &mut state, scan, &mut ctx), Ok(None));
    }

    #[test]
    fn per_shot_effectors_apply_on_every_scan() {
        let mut fx = Fixture::new();
        let (tower, state) = fx.tower(5.0);
        let effector = fx.world.spawn_effector(EffectKind::Poison);
        let mut state = state.with_effectors([effector]);
        let target = fx.world.spawn_target(Vec3::new(1.0, 0.0, 0.0));
        fx.toggle(tower, &mut state, true).unwrap();

        assert_eq!(fx.run_until(tower, &mut state, Tick(2000)), 2);

        // Two initial hits; the second refreshes the end timer.
        assert_eq!(fx.world.hits_on(target).iter().filter(|&&d| d == 2).count(), 2);
        assert_eq!(
            fx.scheduler.remaining_ms(target, ActionId::end(EffectKind::Poison, effector)),
            Some(3000)
        );
    }

    #[test]
    fn multiplier_scales_initial_damage_of_scan() {
        let mut fx = Fixture::new();
        let tower = fx.world.spawn(Vec3::ZERO);
        let targeter = TargeterState::new(5.0, 1000)
            .unwrap()
            .with_multiplier(2.0)
            .unwrap();
        let mut state = TowerState::new(targeter);
        let target = fx.world.spawn_target(Vec3::ZERO);
        fx.toggle(tower, &mut state, true).unwrap();

        fx.run_until(tower, &mut state, Tick(1000));
        assert_eq!(fx.world.hits_on(target), vec![20]);
    }

    #[test]
    fn continuous_effects_follow_targets_in_and_out_of_range() {
        let mut fx = Fixture::new();
        fx.effects
            .insert(EffectDefinition {
                count: EffectCount::Continuous,
                duration: EffectDuration::Permanent,
                ..EffectDefinition::poison()
            })
            .unwrap();
        let (tower, state) = fx.tower(5.0);
        let effector = fx.world.spawn_effector(EffectKind::Poison);
        let mut state = state.with_effectors([effector]);
        let target = fx.world.spawn_target(Vec3::new(2.0, 0.0, 0.0));
        let apply_id = ActionId::apply(EffectKind::Poison, effector);
        fx.toggle(tower, &mut state, true).unwrap();

        fx.run_until(tower, &mut state, Tick(2000));
        // Applied once on entry, not again on the second scan.
        assert_eq!(fx.world.hits_on(target).iter().filter(|&&d| d == 2).count(), 1);
        assert!(fx.scheduler.has_periodic(target, apply_id));

        fx.world.place(target, Vec3::new(9.0, 0.0, 0.0));
        fx.run_until(tower, &mut state, Tick(3000));
        assert!(!fx.scheduler.has_periodic(target, apply_id));
        assert_eq!(fx.world.cues_ended(target, "Towers:PoisonParticleEffect"), 1);
        assert!(state.targeter.affected_enemies.is_empty());
    }

    #[test]
    fn deactivation_releases_continuous_effects() {
        let mut fx = Fixture::new();
        fx.effects
            .insert(EffectDefinition {
                count: EffectCount::Continuous,
                duration: EffectDuration::Permanent,
                ..EffectDefinition::poison()
            })
            .unwrap();
        let (tower, state) = fx.tower(5.0);
        let effector = fx.world.spawn_effector(EffectKind::Poison);
        let mut state = state.with_effectors([effector]);
        let target = fx.world.spawn_target(Vec3::ZERO);
        fx.toggle(tower, &mut state, true).unwrap();
        fx.run_until(tower, &mut state, Tick(1000));

        fx.toggle(tower, &mut state, false).unwrap();

        assert!(fx.scheduler.actions_of(target).is_empty());
        assert!(state.targeter.affected_enemies.is_empty());
    }

    #[test]
    fn effector_without_component_is_a_configuration_error() {
        let mut fx = Fixture::new();
        let (tower, state) = fx.tower(5.0);
        let bogus = fx.world.spawn(Vec3::ZERO);
        let mut state = state.with_effectors([bogus]);
        fx.world.spawn_target(Vec3::ZERO);
        fx.toggle(tower, &mut state, true).unwrap();

        let mut ctx = SystemContext::new(&mut fx.scheduler, &mut fx.world, &fx.effects);
        let scan = TowerLifecycleManager::scan_action(tower);
        let err = fx
            .manager
            .on_periodic(tower, &mut state, scan, &mut ctx)
            .unwrap_err();
        assert_eq!(err, LifecycleError::Effect(EffectError::MissingEffector(bogus)));
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
    }

    #[test]
    fn destroyed_effector_is_skipped_on_scan() {
        let mut fx = Fixture::new();
        let (tower, state) = fx.tower(5.0);
        let poison = fx.world.spawn_effector(EffectKind::Poison);
        let strike = fx.world.spawn_effector(EffectKind::Strike);
        let mut state = state.with_effectors([poison, strike]);
        let target = fx.world.spawn_target(Vec3::ZERO);
        fx.toggle(tower, &mut state, true).unwrap();

        fx.world.kill(poison);
        assert_eq!(fx.run_until(tower, &mut state, Tick(2000)), 2);

        assert_eq!(fx.world.hits_on(target), vec![15, 15]);
        assert!(fx.scheduler.actions_of(target).is_empty());
        assert_eq!(state.targeter.affected_enemies, BTreeSet::from([target]));
    }

    #[test]
    fn failed_scan_keeps_previous_targets() {
        let mut fx = Fixture::new();
        let (tower, state) = fx.tower(5.0);
        let effector = fx.world.spawn_effector(EffectKind::Strike);
        let mut state = state.with_effectors([effector]);
        let target = fx.world.spawn_target(Vec3::ZERO);
        fx.toggle(tower, &mut state, true).unwrap();
        fx.run_until(tower, &mut state, Tick(1000));

        let bogus = fx.world.spawn(Vec3::ZERO);
        state.effectors.push(bogus);
        fx.world.place(target, Vec3::new(9.0, 0.0, 0.0));
        let mut ctx = SystemContext::new(&mut fx.scheduler, &mut fx.world, &fx.effects);
        let scan = TowerLifecycleManager::scan_action(tower);
        assert!(fx.manager.on_periodic(tower, &mut state, scan, &mut ctx).is_err());

        assert_eq!(state.targeter.affected_enemies, BTreeSet::from([target]));
    }
}
