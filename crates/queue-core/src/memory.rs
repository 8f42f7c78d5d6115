//! In-process ledger with block history
//!
//! Stands in for the chain in tests and demos. Every mutation produces a new
//! block, so pinned reads keep observing the block they were pinned to while
//! latest reads move on.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail};

use crate::interval::nominal_lane;
use crate::{Lane, QueueCursor, QueueEntry, QueueLedger, ReadAt, TaggedEntry};

/// Snapshot of both lanes and the cursor at one block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueState {
    pub express: VecDeque<QueueEntry>,
    pub standard: VecDeque<QueueEntry>,
    pub queue_index: u64,
    pub rate: u64,
}

impl QueueState {
    pub fn new(queue_index: u64, rate: u64) -> Self {
        Self {
            queue_index,
            rate,
            ..Default::default()
        }
    }

    pub fn lane(&self, lane: Lane) -> &VecDeque<QueueEntry> {
        match lane {
            Lane::Express => &self.express,
            Lane::Standard => &self.standard,
        }
    }

    pub fn lane_mut(&mut self, lane: Lane) -> &mut VecDeque<QueueEntry> {
        match lane {
            Lane::Express => &mut self.express,
            Lane::Standard => &mut self.standard,
        }
    }

    pub fn enqueue(&mut self, lane: Lane, entry: QueueEntry) {
        self.lane_mut(lane).push_back(entry);
    }

    pub fn cursor(&self) -> QueueCursor {
        QueueCursor::new(self.queue_index, self.rate)
    }

    pub fn total_length(&self) -> u64 {
        (self.express.len() + self.standard.len()) as u64
    }

    /// Assign the next entry the way the deposit pool does
    ///
    /// Takes from the lane owning the current queue index, or from the other
    /// lane when that one is empty, and advances the index.
    pub fn dequeue(&mut self) -> Option<TaggedEntry> {
        let nominal = nominal_lane(self.queue_index, self.rate);
        let lane = if !self.lane(nominal).is_empty() {
            nominal
        } else {
            nominal.other()
        };
        let entry = self.lane_mut(lane).pop_front()?;
        self.queue_index += 1;
        Some(TaggedEntry { lane, entry })
    }
}

/// One `lane_scan` call as seen by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRecord {
    pub lane: Lane,
    pub from: u64,
    pub count: u64,
    pub at: ReadAt,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledDequeue {
    after_reads: u64,
    count: usize,
}

#[derive(Debug)]
struct Inner {
    history: Vec<QueueState>,
    reads: u64,
    scans: Vec<ScanRecord>,
    failing: bool,
    scheduled: Option<ScheduledDequeue>,
}

impl Inner {
    fn latest(&self) -> &QueueState {
        // history always holds the genesis state
        &self.history[self.history.len() - 1]
    }

    fn commit(&mut self, state: QueueState) {
        self.history.push(state);
    }

    fn dequeue(&mut self, count: usize) -> Vec<TaggedEntry> {
        let mut state = self.latest().clone();
        let taken: Vec<TaggedEntry> = (0..count).map_while(|_| state.dequeue()).collect();
        self.commit(state);
        taken
    }
}

/// [`QueueLedger`] over in-memory state
#[derive(Debug)]
pub struct MemoryLedger {
    inner: Mutex<Inner>,
}

impl MemoryLedger {
    pub fn new(state: QueueState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                history: vec![state],
                reads: 0,
                scans: Vec::new(),
                failing: false,
                scheduled: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Latest block number
    pub fn head(&self) -> u64 {
        self.lock().history.len() as u64 - 1
    }

    /// Copy of the latest state
    pub fn latest(&self) -> QueueState {
        self.lock().latest().clone()
    }

    /// Apply a mutation as a new block
    pub fn update(&self, mutate: impl FnOnce(&mut QueueState)) {
        let mut inner = self.lock();
        let mut state = inner.latest().clone();
        mutate(&mut state);
        inner.commit(state);
    }

    pub fn enqueue(&self, lane: Lane, entry: QueueEntry) {
        self.update(|state| state.enqueue(lane, entry));
    }

    /// Process up to `count` entries in one block and return them in order
    pub fn dequeue(&self, count: usize) -> Vec<TaggedEntry> {
        self.lock().dequeue(count)
    }

    /// Process `count` entries right after `after_reads` further reads complete
    pub fn dequeue_after_reads(&self, after_reads: u64, count: usize) {
        let mut inner = self.lock();
        let after_reads = inner.reads + after_reads;
        inner.scheduled = Some(ScheduledDequeue { after_reads, count });
    }

    /// Make every following read fail until switched off
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Number of reads served so far
    pub fn reads(&self) -> u64 {
        self.lock().reads
    }

    pub fn scans(&self) -> Vec<ScanRecord> {
        self.lock().scans.clone()
    }

    pub fn clear_scans(&self) {
        self.lock().scans.clear();
    }

    fn read<T>(&self, at: ReadAt, f: impl FnOnce(&QueueState) -> T) -> anyhow::Result<T> {
        let mut inner = self.lock();
        if inner.failing {
            bail!("memory ledger: injected read failure");
        }

        let value = {
            let state = match at {
                ReadAt::Latest => inner.latest(),
                ReadAt::Block(block) => inner
                    .history
                    .get(block as usize)
                    .ok_or_else(|| anyhow!("memory ledger: unknown block {block}"))?,
            };
            f(state)
        };

        inner.reads += 1;
        if let Some(scheduled) = inner.scheduled {
            if inner.reads >= scheduled.after_reads {
                inner.scheduled = None;
                inner.dequeue(scheduled.count);
            }
        }
        Ok(value)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new(QueueState::default())
    }
}

impl QueueLedger for MemoryLedger {
    async fn head_block(&self) -> anyhow::Result<u64> {
        if self.lock().failing {
            bail!("memory ledger: injected read failure");
        }
        Ok(self.head())
    }

    async fn lane_length(&self, lane: Lane, at: ReadAt) -> anyhow::Result<u64> {
        self.read(at, |state| state.lane(lane).len() as u64)
    }

    async fn lane_scan(
        &self,
        lane: Lane,
        from: u64,
        count: u64,
        at: ReadAt,
    ) -> anyhow::Result<Vec<QueueEntry>> {
        let entries = self.read(at, |state| {
            state
                .lane(lane)
                .iter()
                .skip(from as usize)
                .take(count as usize)
                .copied()
                .collect()
        })?;
        self.lock().scans.push(ScanRecord {
            lane,
            from,
            count,
            at,
        });
        Ok(entries)
    }

    async fn combined_cursor(&self, at: ReadAt) -> anyhow::Result<QueueCursor> {
        self.read(at, QueueState::cursor)
    }
}
