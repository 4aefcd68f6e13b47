//! Default handlers wiring events into the tower core.

use tower_core::{EventKind, TowerEvent};
use tracing::debug;

use super::{DispatchContext, EventDispatcher, EventPriority};
use crate::error::RuntimeError;

/// Registers the lifecycle and effect handlers every runtime needs.
///
/// Structural events restoring or tearing down a tower run at
/// [`EventPriority::High`] so that gameplay observers registered at the
/// default priority see the post-transition state.
pub fn register_default_handlers(dispatcher: &mut EventDispatcher) {
    dispatcher.register(
        EventKind::ActivationRequested,
        "tower_toggle",
        EventPriority::Normal,
        on_activation_requested,
    );
    dispatcher.register(
        EventKind::ItemPlaced,
        "tower_placed",
        EventPriority::Normal,
        on_item_placed,
    );
    dispatcher.register(
        EventKind::BlockToItem,
        "tower_to_item",
        EventPriority::Normal,
        on_block_to_item,
    );
    dispatcher.register(
        EventKind::ComponentActivated,
        "tower_component_activated",
        EventPriority::High,
        on_component_activated,
    );
    dispatcher.register(
        EventKind::Destroyed,
        "tower_destroyed",
        EventPriority::High,
        on_destroyed,
    );
    dispatcher.register(
        EventKind::Destroyed,
        "effect_source_destroyed",
        EventPriority::Normal,
        on_source_destroyed,
    );
    dispatcher.register(
        EventKind::PeriodicFired,
        "tower_scan",
        EventPriority::Normal,
        on_scan,
    );
    dispatcher.register(
        EventKind::PeriodicFired,
        "effect_tick",
        EventPriority::Normal,
        on_effect_tick,
    );
    dispatcher.register(
        EventKind::DelayedFired,
        "effect_expiry",
        EventPriority::Normal,
        on_effect_expiry,
    );
}

fn on_activation_requested(
    event: &TowerEvent,
    ctx: &mut DispatchContext<'_>,
) -> Result<(), RuntimeError> {
    let TowerEvent::ActivationRequested { tower, activated } = *event else {
        return Ok(());
    };
    ctx.with_tower(tower, |lifecycle, state, sys| {
        lifecycle.handle_toggle(tower, state, activated, sys)
    })
    .ok_or(RuntimeError::NotATower(tower))??;
    Ok(())
}

fn on_item_placed(event: &TowerEvent, ctx: &mut DispatchContext<'_>) -> Result<(), RuntimeError> {
    let TowerEvent::ItemPlaced { item, placed } = *event else {
        return Ok(());
    };
    if !ctx.move_tower(item, placed) {
        return Err(RuntimeError::NotAnItem(item));
    }
    ctx.with_tower(placed, |lifecycle, state, sys| {
        lifecycle.on_item_placed(placed, state, sys)
    })
    .transpose()?;
    Ok(())
}

fn on_block_to_item(
    event: &TowerEvent,
    ctx: &mut DispatchContext<'_>,
) -> Result<(), RuntimeError> {
    let TowerEvent::BlockToItem { block, item } = *event else {
        return Ok(());
    };
    ctx.with_tower(block, |lifecycle, state, sys| {
        lifecycle.on_block_to_item(block, state, sys)
    })
    .ok_or(RuntimeError::NotATower(block))?;
    ctx.move_tower(block, item);
    Ok(())
}

fn on_component_activated(
    event: &TowerEvent,
    ctx: &mut DispatchContext<'_>,
) -> Result<(), RuntimeError> {
    let TowerEvent::ComponentActivated { tower } = *event else {
        return Ok(());
    };
    ctx.with_tower(tower, |lifecycle, state, sys| {
        lifecycle.on_component_activated(tower, state, sys)
    })
    .transpose()?;
    Ok(())
}

fn on_destroyed(event: &TowerEvent, ctx: &mut DispatchContext<'_>) -> Result<(), RuntimeError> {
    let TowerEvent::Destroyed { entity } = *event else {
        return Ok(());
    };
    if ctx
        .with_tower(entity, |lifecycle, state, sys| {
            lifecycle.on_destroyed(entity, state, sys)
        })
        .is_some()
    {
        ctx.towers.remove(&entity);
    }
    Ok(())
}

/// Ends every effect the destroyed entity was the source of.
fn on_source_destroyed(
    event: &TowerEvent,
    ctx: &mut DispatchContext<'_>,
) -> Result<(), RuntimeError> {
    let TowerEvent::Destroyed { entity } = *event else {
        return Ok(());
    };
    let applier = *ctx.lifecycle.applier();
    let released = applier.release_source(entity, &mut ctx.system());
    if released > 0 {
        debug!(
            target: "tower_runtime::dispatch",
            source = %entity,
            released,
            "released effects of destroyed source"
        );
    }
    Ok(())
}

fn on_scan(event: &TowerEvent, ctx: &mut DispatchContext<'_>) -> Result<(), RuntimeError> {
    let TowerEvent::PeriodicFired { owner, id } = *event else {
        return Ok(());
    };
    let report = ctx
        .with_tower(owner, |lifecycle, state, sys| {
            lifecycle.on_periodic(owner, state, id, sys)
        })
        .transpose()?
        .flatten();
    if let Some(report) = report {
        debug!(
            target: "tower_runtime::dispatch",
            tower = %owner,
            targets = report.targets.len(),
            applications = report.applications,
            "tower scanned"
        );
    }
    Ok(())
}

fn on_effect_tick(event: &TowerEvent, ctx: &mut DispatchContext<'_>) -> Result<(), RuntimeError> {
    let TowerEvent::PeriodicFired { owner, id } = *event else {
        return Ok(());
    };
    let applier = *ctx.lifecycle.applier();
    applier.on_periodic(owner, id, &mut ctx.system())?;
    Ok(())
}

fn on_effect_expiry(
    event: &TowerEvent,
    ctx: &mut DispatchContext<'_>,
) -> Result<(), RuntimeError> {
    let TowerEvent::DelayedFired { owner, id } = *event else {
        return Ok(());
    };
    let applier = *ctx.lifecycle.applier();
    applier.on_delayed(owner, id, &mut ctx.system())?;
    Ok(())
}
