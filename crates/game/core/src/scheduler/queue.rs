//! Timer table and firing queue.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::scheduler::{ActionId, ActionKey, SchedulerError};
use crate::state::{EntityId, Tick};

/// Timer kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Fires once, then is removed.
    Delayed,
    /// Re-arms itself `period_ms` after every firing until cancelled.
    Periodic { period_ms: u64 },
}

/// Notification produced when a timer fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredAction {
    pub owner: EntityId,
    pub id: ActionId,
    pub kind: ActionKind,
    /// Scheduled time of this firing.
    pub at: Tick,
}

impl FiredAction {
    pub fn key(&self) -> ActionKey {
        ActionKey::new(self.owner, self.id)
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self.kind, ActionKind::Periodic { .. })
    }
}

#[derive(Clone, Copy, Debug)]
struct ActionEntry {
    kind: ActionKind,
    due: Tick,
    seq: u64,
}

/// Keyed one-shot and periodic timers over simulated time.
///
/// # Invariants
///
/// - At most one timer exists per [`ActionKey`], whatever its kind
/// - `queue` holds exactly one `(due, seq)` slot per entry in `entries`
/// - `seq` grows monotonically, so equal `due` values fire in registration order
#[derive(Debug, Default)]
pub struct ActionScheduler {
    now: Tick,
    next_seq: u64,
    entries: HashMap<ActionKey, ActionEntry>,
    queue: BTreeMap<(Tick, u64), ActionKey>,
}

impl ActionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler whose clock starts at `now`.
    pub fn starting_at(now: Tick) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    /// Current scheduler time.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Number of armed timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arms a one-shot timer firing `delay_ms` from now.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DuplicateAction`] if the key is already armed.
    /// Callers that want to restart a timer cancel it first.
    pub fn schedule_delayed(
        &mut self,
        owner: EntityId,
        id: ActionId,
        delay_ms: u64,
    ) -> Result<(), SchedulerError> {
        self.insert(ActionKey::new(owner, id), ActionKind::Delayed, delay_ms)
    }

    /// Arms a repeating timer whose first firing is `initial_delay_ms` from now.
    ///
    /// Callers check [`has_periodic`](Self::has_periodic) first to keep
    /// registration idempotent.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::ZeroPeriod`] if `period_ms` is zero
    /// - [`SchedulerError::DuplicateAction`] if the key is already armed
    pub fn schedule_periodic(
        &mut self,
        owner: EntityId,
        id: ActionId,
        initial_delay_ms: u64,
        period_ms: u64,
    ) -> Result<(), SchedulerError> {
        let key = ActionKey::new(owner, id);
        if period_ms == 0 {
            return Err(SchedulerError::ZeroPeriod(key));
        }
        self.insert(key, ActionKind::Periodic { period_ms }, initial_delay_ms)
    }

    fn insert(&mut self, key: ActionKey, kind: ActionKind, delay_ms: u64) -> Result<(), SchedulerError> {
        if self.entries.contains_key(&key) {
            return Err(SchedulerError::DuplicateAction(key));
        }

        let due = self.now + delay_ms;
        let seq = self.bump_seq();
        self.entries.insert(key, ActionEntry { kind, due, seq });
        self.queue.insert((due, seq), key);

        trace!(
            target: "tower_core::scheduler",
            action = %key,
            kind = ?kind,
            due = %due,
            "scheduled action"
        );
        Ok(())
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Removes the timer if present. Returns whether one was removed.
    pub fn cancel(&mut self, owner: EntityId, id: ActionId) -> bool {
        let key = ActionKey::new(owner, id);
        match self.entries.remove(&key) {
            Some(entry) => {
                self.queue.remove(&(entry.due, entry.seq));
                trace!(target: "tower_core::scheduler", action = %key, "cancelled action");
                true
            }
            None => false,
        }
    }

    /// Removes every timer owned by `owner`. Returns how many were removed.
    ///
    /// Hosts call this from their entity destruction path.
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        let keys: Vec<ActionKey> = self
            .entries
            .keys()
            .filter(|key| key.owner == owner)
            .copied()
            .collect();
        for key in &keys {
            self.cancel(key.owner, key.id);
        }
        keys.len()
    }

    pub fn has_delayed(&self, owner: EntityId, id: ActionId) -> bool {
        matches!(
            self.kind_of(owner, id),
            Some(ActionKind::Delayed)
        )
    }

    pub fn has_periodic(&self, owner: EntityId, id: ActionId) -> bool {
        matches!(
            self.kind_of(owner, id),
            Some(ActionKind::Periodic { .. })
        )
    }

    pub fn kind_of(&self, owner: EntityId, id: ActionId) -> Option<ActionKind> {
        self.entries
            .get(&ActionKey::new(owner, id))
            .map(|entry| entry.kind)
    }

    /// Milliseconds until the timer next fires.
    pub fn remaining_ms(&self, owner: EntityId, id: ActionId) -> Option<u64> {
        self.entries
            .get(&ActionKey::new(owner, id))
            .map(|entry| entry.due.since(self.now))
    }

    /// Ids of every timer owned by `owner`, sorted.
    pub fn actions_of(&self, owner: EntityId) -> Vec<ActionId> {
        let mut ids: Vec<ActionId> = self
            .entries
            .keys()
            .filter(|key| key.owner == owner)
            .map(|key| key.id)
            .collect();
        ids.sort();
        ids
    }

    /// Keys of every timer whose id names `source`, on any owner, sorted.
    pub fn actions_from(&self, source: EntityId) -> Vec<ActionKey> {
        let mut keys: Vec<ActionKey> = self
            .entries
            .keys()
            .filter(|key| key.id.source() == source)
            .copied()
            .collect();
        keys.sort();
        keys
    }

    /// Time of the earliest armed timer.
    pub fn next_due(&self) -> Option<Tick> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Fires the earliest timer due at or before `until`.
    ///
    /// The clock moves to the timer's scheduled time. Periodic timers are
    /// re-armed and one-shot timers removed before the notification is
    /// returned, so a handler inspecting its own key sees the post-firing
    /// state.
    pub fn pop_due(&mut self, until: Tick) -> Option<FiredAction> {
        let (&(due, seq), &key) = self.queue.iter().next()?;
        if due > until {
            return None;
        }
        self.queue.remove(&(due, seq));
        self.now = self.now.max(due);

        let kind = match self.entries.get(&key) {
            Some(entry) => entry.kind,
            None => {
                debug_assert!(false, "queued action {key} has no entry");
                return self.pop_due(until);
            }
        };

        match kind {
            ActionKind::Periodic { period_ms } => {
                let next = due + period_ms;
                let next_seq = self.bump_seq();
                self.entries.insert(
                    key,
                    ActionEntry {
                        kind,
                        due: next,
                        seq: next_seq,
                    },
                );
                self.queue.insert((next, next_seq), key);
            }
            ActionKind::Delayed => {
                self.entries.remove(&key);
            }
        }

        trace!(target: "tower_core::scheduler", action = %key, at = %due, "fired action");
        Some(FiredAction {
            owner: key.owner,
            id: key.id,
            kind,
            at: due,
        })
    }

    /// Moves the clock forward to `until`.
    ///
    /// Call after draining [`pop_due`](Self::pop_due); timers that are still
    /// due stay queued and fire on the next drain.
    pub fn advance_to(&mut self, until: Tick) {
        self.now = self.now.max(until);
    }
}
