//! Interval accounting: how many virtual positions of a range each lane serves
//!
//! The combined queue repeats a cycle of `rate + 1` positions. Exactly one
//! position per cycle, the one congruent to `rate`, belongs to the standard
//! lane; the other `rate` positions belong to the express lane. This mirrors
//! the deposit pool's own check `index % (rate + 1) != rate` for express.
//!
//! When the nominal lane of a position is empty the other lane serves it, so
//! the counts below are clamped to what each lane can still provide.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::Lane;

/// Lane holding the single slot of each cycle
pub const PRIMARY_LANE: Lane = Lane::Standard;

/// Number of virtual positions in one interleaving cycle
pub fn cycle_len(rate: u64) -> u64 {
    rate.saturating_add(1)
}

/// Lane nominally responsible for `position`, ignoring exhaustion
pub fn nominal_lane(position: u64, rate: u64) -> Lane {
    if position % cycle_len(rate) == rate {
        PRIMARY_LANE
    } else {
        PRIMARY_LANE.other()
    }
}

/// Per-lane entry counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneCounts {
    pub express: u64,
    pub standard: u64,
}

impl LaneCounts {
    pub fn new(express: u64, standard: u64) -> Self {
        Self { express, standard }
    }

    pub fn get(&self, lane: Lane) -> u64 {
        match lane {
            Lane::Express => self.express,
            Lane::Standard => self.standard,
        }
    }

    pub fn total(&self) -> u64 {
        self.express + self.standard
    }

    /// Remaining availability after `used` entries were consumed
    pub fn saturating_sub(&self, used: LaneCounts) -> LaneCounts {
        LaneCounts {
            express: self.express.saturating_sub(used.express),
            standard: self.standard.saturating_sub(used.standard),
        }
    }
}

/// Count how many positions of `positions` resolve to each lane
///
/// `positions` is half-open; the closed interval `[start, end]` is
/// `start..end + 1`, and an empty range yields zero for both lanes.
/// `available` is how many entries each lane still holds at `positions.start`.
pub fn count_positions(positions: Range<u64>, rate: u64, available: LaneCounts) -> LaneCounts {
    let total = positions.end.saturating_sub(positions.start);
    if total == 0 {
        return LaneCounts::default();
    }

    let cycle = cycle_len(rate);
    let mut primary = total / cycle;
    // a partial cycle that wraps past the primary slot holds one more of it
    if positions.end % cycle < positions.start % cycle {
        primary += 1;
    }

    let available_primary = available.get(PRIMARY_LANE);
    let available_secondary = available.get(PRIMARY_LANE.other());

    primary = primary.min(available_primary);
    let secondary = (total - primary).min(available_secondary);
    if primary + secondary < total {
        primary = (total - secondary).min(available_primary);
    }

    match PRIMARY_LANE {
        Lane::Standard => LaneCounts::new(secondary, primary),
        Lane::Express => LaneCounts::new(primary, secondary),
    }
}
