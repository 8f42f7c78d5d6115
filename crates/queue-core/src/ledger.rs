//! Remote ledger accessor: the only way the engine sees queue state

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Lane, QueueCursor, QueueEntry};

/// Point in chain history a read observes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadAt {
    /// Whatever the node considers latest at the time of the call
    #[default]
    Latest,
    /// State at the end of a specific block
    Block(u64),
}

/// Read-only access to the two deposit queue lanes
///
/// Unpinned reads are independent of each other: two calls may observe
/// different blocks. Implementations must not retry internally beyond what
/// their transport does; any failure is returned to the engine as is.
pub trait QueueLedger: Send + Sync {
    /// Current head block number, used to pin the reads of one request
    fn head_block(&self) -> impl Future<Output = anyhow::Result<u64>> + Send;

    /// Number of entries currently waiting in `lane`
    fn lane_length(&self, lane: Lane, at: ReadAt)
        -> impl Future<Output = anyhow::Result<u64>> + Send;

    /// Up to `count` entries of `lane` starting at `from`, oldest first
    ///
    /// May return fewer than `count` if the lane is shorter.
    fn lane_scan(
        &self,
        lane: Lane,
        from: u64,
        count: u64,
        at: ReadAt,
    ) -> impl Future<Output = anyhow::Result<Vec<QueueEntry>>> + Send;

    /// Queue index and express rate
    fn combined_cursor(&self, at: ReadAt)
        -> impl Future<Output = anyhow::Result<QueueCursor>> + Send;
}

impl<T: QueueLedger> QueueLedger for Arc<T> {
    fn head_block(&self) -> impl Future<Output = anyhow::Result<u64>> + Send {
        (**self).head_block()
    }

    fn lane_length(
        &self,
        lane: Lane,
        at: ReadAt,
    ) -> impl Future<Output = anyhow::Result<u64>> + Send {
        (**self).lane_length(lane, at)
    }

    fn lane_scan(
        &self,
        lane: Lane,
        from: u64,
        count: u64,
        at: ReadAt,
    ) -> impl Future<Output = anyhow::Result<Vec<QueueEntry>>> + Send {
        (**self).lane_scan(lane, from, count, at)
    }

    fn combined_cursor(
        &self,
        at: ReadAt,
    ) -> impl Future<Output = anyhow::Result<QueueCursor>> + Send {
        (**self).combined_cursor(at)
    }
}
