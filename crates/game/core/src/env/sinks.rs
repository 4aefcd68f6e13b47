//! Outbound effects of the core: damage and visual/audio cues.

use crate::state::EntityId;

pub trait DamageSink {
    fn deliver_damage(&mut self, target: EntityId, amount: u32);
}

pub trait CueSink {
    fn begin_cue(&mut self, target: EntityId, cue: &str);
    fn end_cue(&mut self, target: EntityId, cue: &str);
}
