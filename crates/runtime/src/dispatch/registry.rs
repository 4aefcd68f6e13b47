//! Handler table and delivery loop.

use std::collections::HashMap;

use tower_core::{EventKind, TowerEvent};
use tracing::{error, trace};

use super::{DispatchContext, EventPriority};
use crate::error::RuntimeError;

/// Boxed handler closure.
pub type EventHandler =
    Box<dyn Fn(&TowerEvent, &mut DispatchContext<'_>) -> Result<(), RuntimeError>>;

struct RegisteredHandler {
    name: &'static str,
    priority: EventPriority,
    handler: EventHandler,
}

/// Table from event kind to its handlers, sorted by priority.
#[derive(Default)]
pub struct EventDispatcher {
    table: HashMap<EventKind, Vec<RegisteredHandler>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher with the tower lifecycle and effect handlers.
    pub fn with_default_handlers() -> Self {
        let mut dispatcher = Self::new();
        super::register_default_handlers(&mut dispatcher);
        dispatcher
    }

    /// Registers `handler` for events of `kind`.
    ///
    /// Handlers with equal priority keep their registration order.
    pub fn register(
        &mut self,
        kind: EventKind,
        name: &'static str,
        priority: EventPriority,
        handler: impl Fn(&TowerEvent, &mut DispatchContext<'_>) -> Result<(), RuntimeError> + 'static,
    ) {
        let handlers = self.table.entry(kind).or_default();
        handlers.push(RegisteredHandler {
            name,
            priority,
            handler: Box::new(handler),
        });
        handlers.sort_by_key(|h| h.priority);
    }

    /// Delivers `event` to every handler registered for its kind.
    ///
    /// # Errors
    ///
    /// Returns the first handler error; later handlers do not run.
    pub fn dispatch(
        &self,
        event: &TowerEvent,
        ctx: &mut DispatchContext<'_>,
    ) -> Result<(), RuntimeError> {
        let kind = event.kind();
        let Some(handlers) = self.table.get(&kind) else {
            return Ok(());
        };

        for registered in handlers {
            trace!(
                target: "tower_runtime::dispatch",
                event = %kind,
                handler = registered.name,
                entity = %event.entity(),
                "delivering event"
            );
            if let Err(e) = (registered.handler)(event, ctx) {
                error!(
                    target: "tower_runtime::dispatch",
                    event = %kind,
                    handler = registered.name,
                    severity = e.severity().as_str(),
                    code = e.error_code(),
                    error = %e,
                    "handler failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Handler names and priorities for `kind`, in delivery order.
    pub fn handlers(&self, kind: EventKind) -> impl Iterator<Item = (&'static str, EventPriority)> + '_ {
        self.table
            .get(&kind)
            .into_iter()
            .flatten()
            .map(|h| (h.name, h.priority))
    }

    /// Total number of registered handlers.
    pub fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
