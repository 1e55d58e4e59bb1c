//! Sliding-window event counter keyed by block position.
//!
//! Each [`RateCounter::count`] records an expiry tick `now + timeout` for a
//! position. [`RateCounter::counter`] prunes expiries strictly before `now`
//! and reports how many remain. Used to cap oscillating components, e.g. a
//! torch that toggles too often in a short window.
//!
//! One counter is owned by each world, so it is reached only through the
//! world's mutation authority. Positions whose expiry list empties are
//! removed on the spot.

use std::collections::BTreeMap;

use crate::voxel::BlockPos;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

#[derive(Debug, Clone, Default)]
pub struct RateCounter {
    expiries: BTreeMap<BlockPos, Vec<Ticks>>,
}

impl RateCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event at `pos` that stays counted until `now + timeout`.
    pub fn count(&mut self, pos: BlockPos, timeout: Ticks, now: Ticks) {
        self.expiries
            .entry(pos)
            .or_default()
            .push(now.saturating_add(timeout));
    }

    /// Number of events at `pos` that have not expired at `now`.
    pub fn counter(&mut self, pos: BlockPos, now: Ticks) -> usize {
        let Some(list) = self.expiries.get_mut(&pos) else {
            return 0;
        };
        list.retain(|&expiry| expiry >= now);
        let remaining = list.len();
        if remaining == 0 {
            self.expiries.remove(&pos);
        }
        remaining
    }

    /// Number of positions with at least one outstanding expiry.
    pub fn tracked_positions(&self) -> usize {
        self.expiries.len()
    }

    /// Drop every position whose expiries have all passed.
    pub fn prune(&mut self, now: Ticks) {
        self.expiries.retain(|_, list| {
            list.retain(|&expiry| expiry >= now);
            !list.is_empty()
        });
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }
}
