//! Range queries over candidate targets.

use std::collections::BTreeSet;

use crate::state::{EntityId, Vec3};

/// Selects the candidates a tower can reach.
#[derive(Clone, Copy, Debug, Default)]
pub struct TargetSelector;

impl TargetSelector {
    /// Returns every candidate whose squared distance to `origin` is at most
    /// `range * range`.
    ///
    /// The comparison is exact: a candidate at exactly `range` is included.
    pub fn select(
        origin: Vec3,
        range: f32,
        candidates: impl IntoIterator<Item = (EntityId, Vec3)>,
    ) -> BTreeSet<EntityId> {
        let range = f64::from(range);
        let range_sqrd = range * range;
        candidates
            .into_iter()
            .filter(|(_, position)| position.distance_squared(origin) <= range_sqrd)
            .map(|(id, _)| id)
            .collect()
    }
}
