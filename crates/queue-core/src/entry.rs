//! Queue entries and the combined cursor

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::interval;
use crate::Lane;

/// One validator waiting in a deposit queue lane
///
/// Amounts are kept in milliether, the unit the list contract stores them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Megapool contract that owns the validator
    pub owner_address: Address,
    /// Validator id within the megapool
    pub slot_id: u32,
    /// Bond supplied by the node operator (milliether)
    pub bond_amount: u32,
    /// Total deposit requested for the validator (milliether)
    pub total_size: u32,
}

impl QueueEntry {
    pub fn new(owner_address: Address, slot_id: u32, bond_amount: u32, total_size: u32) -> Self {
        Self {
            owner_address,
            slot_id,
            bond_amount,
            total_size,
        }
    }
}

/// Entry of a combined page, tagged with the lane it was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEntry {
    pub lane: Lane,
    #[serde(flatten)]
    pub entry: QueueEntry,
}

/// Position of the protocol in the interleaving pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCursor {
    /// Virtual position of the next entry to be processed
    pub queue_index: u64,
    /// Express slots per standard slot
    pub rate: u64,
}

impl QueueCursor {
    pub fn new(queue_index: u64, rate: u64) -> Self {
        Self { queue_index, rate }
    }

    /// Lane nominally responsible for a virtual position
    pub fn nominal_lane(&self, position: u64) -> Lane {
        interval::nominal_lane(position, self.rate)
    }
}
