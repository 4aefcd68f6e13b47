//! Effect application and the stacking rules between applications.

use tracing::debug;

use crate::context::SystemContext;
use crate::effect::{EffectDefinition, EffectDuration, EffectError, EffectKind, StackingPolicy};
use crate::scheduler::{ActionId, ActionPurpose};
use crate::state::EntityId;

/// What an application did to the target's timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Application {
    /// Initial damage only; the effect has no timers.
    Instant,
    /// Onset cue started and tick/end timers armed.
    Fresh,
    /// Same-source reapplication restarted the end timer.
    Refreshed,
    /// Same-source reapplication lengthened the end timer.
    Extended,
    /// A permanent effect from this source was already ticking.
    Sustained,
}

/// Applies effects on behalf of effectors and reacts to their timers.
///
/// # Stacking
///
/// Timers live on the target and are keyed by effector, so:
/// - the same effector reapplying an effect touches only its end timer
/// - different effectors run fully independent tick/end pairs
#[derive(Clone, Copy, Debug, Default)]
pub struct EffectApplier;

impl EffectApplier {
    pub fn new() -> Self {
        Self
    }

    /// Applies `kind` from `effector` to `target`.
    ///
    /// The initial damage, scaled by `multiplier`, is delivered on every call
    /// regardless of stacking state.
    ///
    /// # Errors
    ///
    /// - [`EffectError::UnknownEffect`] if `kind` is not registered
    /// - [`EffectError::Scheduler`] if a timer could not be armed
    pub fn apply(
        &self,
        effector: EntityId,
        target: EntityId,
        kind: EffectKind,
        multiplier: f32,
        ctx: &mut SystemContext<'_>,
    ) -> Result<Application, EffectError> {
        let effects = ctx.effects;
        let definition = effects.require(kind)?;

        ctx.world
            .deliver_damage(target, scale(definition.initial_damage, multiplier));

        let apply_id = ActionId::apply(kind, effector);
        let end_id = ActionId::end(kind, effector);

        let application = match definition.duration {
            EffectDuration::Instant => Application::Instant,
            EffectDuration::Lasting => {
                if ctx.scheduler.has_delayed(target, end_id) {
                    let remaining = ctx.scheduler.remaining_ms(target, end_id).unwrap_or(0);
                    let (lifetime, application) = match definition.stacking {
                        StackingPolicy::Refresh => (definition.lifetime_ms, Application::Refreshed),
                        StackingPolicy::Extend => (
                            remaining.saturating_add(definition.lifetime_ms),
                            Application::Extended,
                        ),
                    };
                    ctx.scheduler.cancel(target, end_id);
                    ctx.scheduler.schedule_delayed(target, end_id, lifetime)?;
                    application
                } else {
                    self.begin(target, definition, ctx);
                    if !ctx.scheduler.has_periodic(target, apply_id) {
                        ctx.scheduler.schedule_periodic(
                            target,
                            apply_id,
                            definition.tick_period_ms,
                            definition.tick_period_ms,
                        )?;
                    }
                    ctx.scheduler
                        .schedule_delayed(target, end_id, definition.lifetime_ms)?;
                    Application::Fresh
                }
            }
            EffectDuration::Permanent => {
                if ctx.scheduler.has_periodic(target, apply_id) {
                    Application::Sustained
                } else {
                    self.begin(target, definition, ctx);
                    ctx.scheduler.schedule_periodic(
                        target,
                        apply_id,
                        definition.tick_period_ms,
                        definition.tick_period_ms,
                    )?;
                    Application::Fresh
                }
            }
        };

        debug!(
            target: "tower_core::effects",
            effect = %kind,
            effector = %effector,
            target_entity = %target,
            application = ?application,
            "applied effect"
        );
        Ok(application)
    }

    /// Cancels both timers of `kind` from `effector` on `target` and ends its cue.
    ///
    /// Returns false if the effect was not running.
    pub fn remove(
        &self,
        effector: EntityId,
        target: EntityId,
        kind: EffectKind,
        ctx: &mut SystemContext<'_>,
    ) -> bool {
        let ticking = ctx.scheduler.cancel(target, ActionId::apply(kind, effector));
        let expiring = ctx.scheduler.cancel(target, ActionId::end(kind, effector));
        if !(ticking || expiring) {
            return false;
        }
        self.end_cue(target, kind, ctx);
        debug!(
            target: "tower_core::effects",
            effect = %kind,
            effector = %effector,
            target_entity = %target,
            "removed effect"
        );
        true
    }

    /// Removes every effect `effector` is running, on every target.
    ///
    /// Hosts call this when a source entity is destroyed. Returns the number
    /// of effects removed.
    pub fn release_source(&self, effector: EntityId, ctx: &mut SystemContext<'_>) -> usize {
        let mut running: Vec<(EntityId, EffectKind)> = ctx
            .scheduler
            .actions_from(effector)
            .into_iter()
            .filter_map(|key| match key.id.purpose() {
                ActionPurpose::ApplyEffect(kind) | ActionPurpose::EndEffect(kind) => {
                    Some((key.owner, kind))
                }
                _ => None,
            })
            .collect();
        running.sort();
        running.dedup();
        running
            .into_iter()
            .filter(|&(target, kind)| self.remove(effector, target, kind, ctx))
            .count()
    }

    /// Handles a periodic firing on `target`.
    ///
    /// Returns `Ok(false)` if `id` is not an effect tick. Ticks whose target
    /// or effector no longer exists are dropped.
    pub fn on_periodic(
        &self,
        target: EntityId,
        id: ActionId,
        ctx: &mut SystemContext<'_>,
    ) -> Result<bool, EffectError> {
        let ActionPurpose::ApplyEffect(kind) = id.purpose() else {
            return Ok(false);
        };
        let effector = id.source();

        if !ctx.world.exists(target) || !ctx.world.exists(effector) {
            debug!(
                target: "tower_core::effects",
                action = %id,
                target_entity = %target,
                "dropping tick for missing entity"
            );
            return Ok(true);
        }

        let effects = ctx.effects;
        let definition = effects.require(kind)?;
        ctx.world.deliver_damage(target, definition.tick_damage);
        Ok(true)
    }

    /// Handles a delayed firing on `target`.
    ///
    /// Returns `Ok(false)` if `id` is not an effect expiry.
    pub fn on_delayed(
        &self,
        target: EntityId,
        id: ActionId,
        ctx: &mut SystemContext<'_>,
    ) -> Result<bool, EffectError> {
        let ActionPurpose::EndEffect(kind) = id.purpose() else {
            return Ok(false);
        };
        let effector = id.source();

        ctx.scheduler.cancel(target, ActionId::apply(kind, effector));
        self.end_cue(target, kind, ctx);
        debug!(
            target: "tower_core::effects",
            effect = %kind,
            effector = %effector,
            target_entity = %target,
            "effect expired"
        );
        Ok(true)
    }

    fn begin(&self, target: EntityId, definition: &EffectDefinition, ctx: &mut SystemContext<'_>) {
        if let Some(cue) = definition.cue.as_deref() {
            ctx.world.begin_cue(target, cue);
        }
    }

    fn end_cue(&self, target: EntityId, kind: EffectKind, ctx: &mut SystemContext<'_>) {
        let effects = ctx.effects;
        if let Some(cue) = effects.get(kind).and_then(|d| d.cue.as_deref()) {
            ctx.world.end_cue(target, cue);
        }
    }
}

/// Scales a damage amount by a balancing multiplier, rounding to nearest.
fn scale(amount: u32, multiplier: f32) -> u32 {
    (amount as f32 * multiplier).round() as u32
}
