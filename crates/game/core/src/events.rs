//! Inbound notifications the host delivers to the core.

use crate::scheduler::{ActionId, FiredAction};
use crate::state::EntityId;

/// Discriminant of a [`TowerEvent`], used to route events to handlers.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    ActivationRequested,
    ItemPlaced,
    BlockToItem,
    ComponentActivated,
    Destroyed,
    PeriodicFired,
    DelayedFired,
}

/// A single simulation event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TowerEvent {
    /// Explicit activation toggle, usually from a player.
    ActivationRequested { tower: EntityId, activated: bool },
    /// A tower item was placed back into the world as `placed`.
    ItemPlaced { item: EntityId, placed: EntityId },
    /// A tower block was converted into `item`.
    BlockToItem { block: EntityId, item: EntityId },
    /// The tower component became active, e.g. on world load.
    ComponentActivated { tower: EntityId },
    /// The entity is about to be destroyed.
    Destroyed { entity: EntityId },
    PeriodicFired { owner: EntityId, id: ActionId },
    DelayedFired { owner: EntityId, id: ActionId },
}

impl TowerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ActivationRequested { .. } => EventKind::ActivationRequested,
            Self::ItemPlaced { .. } => EventKind::ItemPlaced,
            Self::BlockToItem { .. } => EventKind::BlockToItem,
            Self::ComponentActivated { .. } => EventKind::ComponentActivated,
            Self::Destroyed { .. } => EventKind::Destroyed,
            Self::PeriodicFired { .. } => EventKind::PeriodicFired,
            Self::DelayedFired { .. } => EventKind::DelayedFired,
        }
    }

    /// Entity the event is delivered against.
    pub fn entity(&self) -> EntityId {
        match *self {
            Self::ActivationRequested { tower, .. } | Self::ComponentActivated { tower } => tower,
            Self::ItemPlaced { placed, .. } => placed,
            Self::BlockToItem { block, .. } => block,
            Self::Destroyed { entity } => entity,
            Self::PeriodicFired { owner, .. } | Self::DelayedFired { owner, .. } => owner,
        }
    }
}

impl From<FiredAction> for TowerEvent {
    fn from(fired: FiredAction) -> Self {
        if fired.is_periodic() {
            Self::PeriodicFired {
                owner: fired.owner,
                id: fired.id,
            }
        } else {
            Self::DelayedFired {
                owner: fired.owner,
                id: fired.id,
            }
        }
    }
}
