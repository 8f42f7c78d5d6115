//! Windowed merge engine
//!
//! Serves pages of a single lane or of the combined queue without reading
//! more of either lane than the page needs. Lane lists can only be scanned
//! from their head, so reaching entry `k` of a lane costs `k` entries; the
//! engine keeps that cost at `skip + fetch` per lane.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::interleave::interleave;
use crate::interval::{count_positions, LaneCounts};
use crate::{
    EngineConfig, Error, Lane, QueueCursor, QueueEntry, QueueLedger, ReadAt, Result, TaggedEntry,
};

/// One page of a single lane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanePage {
    pub lane: Lane,
    /// Lane length observed while building the page
    pub total_length: u64,
    /// Offset of the first entry within the lane
    pub start: u64,
    pub entries: Vec<QueueEntry>,
    /// Block the reads were pinned to, if any
    pub block: Option<u64>,
}

/// One page of the combined queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedPage {
    /// Sum of both lane lengths observed while building the page
    pub total_length: u64,
    /// Offset of the first entry within the combined queue
    pub start: u64,
    pub cursor: QueueCursor,
    /// Lane lengths the page was sized against
    pub lengths: LaneCounts,
    pub entries: Vec<TaggedEntry>,
    pub block: Option<u64>,
}

/// Queue cursor and lane lengths read together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub cursor: QueueCursor,
    pub lengths: LaneCounts,
    pub block: Option<u64>,
}

impl CombinedPage {
    /// Virtual position of the first entry
    pub fn first_position(&self) -> u64 {
        self.cursor.queue_index + self.start
    }

    /// Entries drawn from each lane
    pub fn lane_counts(&self) -> LaneCounts {
        self.entries
            .iter()
            .fold(LaneCounts::default(), |mut counts, tagged| {
                match tagged.lane {
                    Lane::Express => counts.express += 1,
                    Lane::Standard => counts.standard += 1,
                }
                counts
            })
    }
}

/// Skip and fetch sizing for one combined page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    /// Entries of each lane consumed before the page starts
    pub skip: LaneCounts,
    /// Entries of each lane inside the page
    pub fetch: LaneCounts,
}

impl WindowPlan {
    /// Size the window `[start, start + limit)` of the combined queue
    ///
    /// Positions are virtual, so both intervals are offset by the queue index.
    pub fn new(cursor: QueueCursor, lengths: LaneCounts, start: u64, limit: u64) -> Result<Self> {
        let first = cursor
            .queue_index
            .checked_add(start)
            .ok_or(Error::PositionOverflow {
                queue_index: cursor.queue_index,
                offset: start,
            })?;
        // positions past the end of both lanes resolve to nothing
        let window = limit.min(lengths.total().saturating_sub(start));
        let end = first.checked_add(window).ok_or(Error::PositionOverflow {
            queue_index: cursor.queue_index,
            offset: start.saturating_add(window),
        })?;

        let skip = count_positions(cursor.queue_index..first, cursor.rate, lengths);
        let fetch = count_positions(first..end, cursor.rate, lengths.saturating_sub(skip));
        Ok(Self { skip, fetch })
    }
}

/// Builds queue pages from a [`QueueLedger`]
pub struct QueueEngine<L> {
    ledger: L,
    config: EngineConfig,
}

impl<L: QueueLedger> QueueEngine<L> {
    pub fn new(ledger: L) -> Self {
        Self::with_config(ledger, EngineConfig::default())
    }

    pub fn with_config(ledger: L, config: EngineConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read point for one request: the head block when pinning, else latest
    ///
    /// Pass the result to the `*_at` methods to serve several views from the
    /// same block.
    pub async fn read_point(&self) -> Result<ReadAt> {
        if self.config.pin_reads {
            Ok(ReadAt::Block(self.ledger.head_block().await?))
        } else {
            Ok(ReadAt::Latest)
        }
    }

    /// Current cursor and lane lengths in one consistent read
    pub async fn status(&self) -> Result<QueueStatus> {
        let at = self.read_point().await?;
        self.status_at(at).await
    }

    pub async fn status_at(&self, at: ReadAt) -> Result<QueueStatus> {
        let (cursor, lengths) = self.read_shape(at).await?;
        Ok(QueueStatus {
            cursor,
            lengths,
            block: pinned_block(at),
        })
    }

    async fn read_shape(&self, at: ReadAt) -> Result<(QueueCursor, LaneCounts)> {
        let (express, standard, cursor) = futures::try_join!(
            self.ledger.lane_length(Lane::Express, at),
            self.ledger.lane_length(Lane::Standard, at),
            self.ledger.combined_cursor(at),
        )?;
        Ok((cursor, LaneCounts::new(express, standard)))
    }

    /// Entries `start..start + limit` of one lane
    pub async fn get_lane_page(&self, lane: Lane, start: u64, limit: u64) -> Result<LanePage> {
        if limit == 0 {
            return Err(Error::InvalidLimit(limit));
        }
        let at = self.read_point().await?;
        self.get_lane_page_at(lane, start, limit, at).await
    }

    pub async fn get_lane_page_at(
        &self,
        lane: Lane,
        start: u64,
        limit: u64,
        at: ReadAt,
    ) -> Result<LanePage> {
        if limit == 0 {
            return Err(Error::InvalidLimit(limit));
        }

        let total_length = self.ledger.lane_length(lane, at).await?;
        let block = pinned_block(at);

        if start >= total_length {
            return Ok(LanePage {
                lane,
                total_length,
                start,
                entries: Vec::new(),
                block,
            });
        }

        let fetch = limit.min(total_length - start);
        let entries = self.bounded_scan(lane, start, fetch, at).await?;
        if matches!(at, ReadAt::Block(_)) && (entries.len() as u64) < fetch {
            return Err(Error::ScanShortfall {
                lane,
                expected: fetch,
                actual: entries.len() as u64,
            });
        }

        Ok(LanePage {
            lane,
            total_length,
            start,
            entries,
            block,
        })
    }

    /// Entries `start..start + limit` of the combined queue, in processing order
    pub async fn get_combined_page(&self, start: u64, limit: u64) -> Result<CombinedPage> {
        if limit == 0 {
            return Err(Error::InvalidLimit(limit));
        }
        let at = self.read_point().await?;
        self.get_combined_page_at(start, limit, at).await
    }

    /// Combined page observed at `at`
    ///
    /// A pinned read sees one block, so lane scans must return exactly what
    /// the lengths promised and any shortfall is a defect. Reads at latest
    /// may watch the queue drain between the length and scan calls; the page
    /// is then built from what the scans returned.
    pub async fn get_combined_page_at(
        &self,
        start: u64,
        limit: u64,
        at: ReadAt,
    ) -> Result<CombinedPage> {
        if limit == 0 {
            return Err(Error::InvalidLimit(limit));
        }

        let (cursor, lengths) = self.read_shape(at).await?;
        let total_length = lengths.total();
        let block = pinned_block(at);

        if start >= total_length {
            return Ok(CombinedPage {
                total_length,
                start,
                cursor,
                lengths,
                entries: Vec::new(),
                block,
            });
        }

        let plan = WindowPlan::new(cursor, lengths, start, limit)?;
        debug!(
            start,
            limit,
            queue_index = cursor.queue_index,
            rate = cursor.rate,
            skip_express = plan.skip.express,
            skip_standard = plan.skip.standard,
            fetch_express = plan.fetch.express,
            fetch_standard = plan.fetch.standard,
            "Sized combined window"
        );

        let (express, standard) = futures::try_join!(
            self.bounded_scan(Lane::Express, plan.skip.express, plan.fetch.express, at),
            self.bounded_scan(Lane::Standard, plan.skip.standard, plan.fetch.standard, at),
        )?;

        let received = LaneCounts::new(express.len() as u64, standard.len() as u64);
        let positions = match at {
            ReadAt::Block(_) => plan.fetch.total(),
            ReadAt::Latest => {
                if received != plan.fetch {
                    warn!(
                        expected_express = plan.fetch.express,
                        expected_standard = plan.fetch.standard,
                        received_express = received.express,
                        received_standard = received.standard,
                        "Lane scans returned fewer entries than sized, queue moved between reads"
                    );
                }
                received.total()
            }
        };

        let first = cursor.queue_index + start;
        let entries = interleave(first..first + positions, cursor.rate, express, standard)?;

        Ok(CombinedPage {
            total_length,
            start,
            cursor,
            lengths,
            entries,
            block,
        })
    }

    /// Read `skip + fetch` entries from the head of `lane` and keep the last `fetch`
    async fn bounded_scan(
        &self,
        lane: Lane,
        skip: u64,
        fetch: u64,
        at: ReadAt,
    ) -> Result<Vec<QueueEntry>> {
        if fetch == 0 {
            return Ok(Vec::new());
        }

        let requested = skip.saturating_add(fetch);
        let mut entries = self.ledger.lane_scan(lane, 0, requested, at).await?;
        let actual = entries.len() as u64;

        if actual > requested {
            return Err(Error::ScanOverrun {
                lane,
                requested,
                actual,
            });
        }
        if actual < requested {
            debug!(%lane, requested, actual, "Lane scan came back short");
        }

        let skipped = (skip as usize).min(entries.len());
        Ok(entries.split_off(skipped))
    }
}

fn pinned_block(at: ReadAt) -> Option<u64> {
    match at {
        ReadAt::Block(block) => Some(block),
        ReadAt::Latest => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryLedger, QueueState};
    use alloy_primitives::Address;

    fn entry(lane: Lane, id: u32) -> QueueEntry {
        let tag = match lane {
            Lane::Express => 0xee,
            Lane::Standard => 0x55,
        };
        QueueEntry::new(Address::repeat_byte(tag), id, 4_000, 32_000)
    }

    fn ledger(queue_index: u64, rate: u64, express: u32, standard: u32) -> MemoryLedger {
        let mut state = QueueState::new(queue_index, rate);
        for id in 0..express {
            state.enqueue(Lane::Express, entry(Lane::Express, id));
        }
        for id in 0..standard {
            state.enqueue(Lane::Standard, entry(Lane::Standard, id));
        }
        MemoryLedger::new(state)
    }

    #[test]
    fn test_window_plan_offsets_by_queue_index() {
        // rate 2 from index 1: positions 1..=3 are E S E, 4..=5 are E S
        let plan = WindowPlan::new(QueueCursor::new(1, 2), LaneCounts::new(10, 10), 3, 2).unwrap();
        assert_eq!(plan.skip, LaneCounts::new(2, 1));
        assert_eq!(plan.fetch, LaneCounts::new(1, 1));
    }

    #[test]
    fn test_window_plan_overflow() {
        let err = WindowPlan::new(QueueCursor::new(u64::MAX, 2), LaneCounts::new(5, 5), 1, 2)
            .unwrap_err();
        assert!(matches!(err, Error::PositionOverflow { .. }));
    }

    #[tokio::test]
    async fn test_zero_limit_rejected_without_reads() {
        let engine = QueueEngine::new(ledger(0, 2, 3, 3));
        let err = engine.get_combined_page(0, 0).await.unwrap_err();
        assert!(err.is_invalid_argument());
        let err = engine.get_lane_page(Lane::Express, 0, 0).await.unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(engine.ledger().reads(), 0);
    }

    #[tokio::test]
    async fn test_lane_page() {
        let engine = QueueEngine::new(ledger(0, 2, 10, 0));
        let page = engine.get_lane_page(Lane::Express, 4, 3).await.unwrap();
        assert_eq!(page.total_length, 10);
        assert_eq!(
            page.entries.iter().map(|e| e.slot_id).collect::<Vec<_>>(),
            vec![4, 5, 6]
        );
        assert_eq!(page.block, Some(0));
    }

    #[tokio::test]
    async fn test_lane_page_tail_and_past_end() {
        let engine = QueueEngine::new(ledger(0, 2, 0, 5));
        let page = engine.get_lane_page(Lane::Standard, 3, 10).await.unwrap();
        assert_eq!(page.entries.len(), 2);

        let page = engine.get_lane_page(Lane::Standard, 5, 10).await.unwrap();
        assert_eq!(page.total_length, 5);
        assert!(page.entries.is_empty());
    }

    #[tokio::test]
    async fn test_combined_exhaustion_fallback() {
        let engine = QueueEngine::new(ledger(0, 2, 1, 5));
        let page = engine.get_combined_page(0, 4).await.unwrap();
        assert_eq!(page.total_length, 6);
        assert_eq!(page.lane_counts(), LaneCounts::new(1, 3));
        let lanes: Vec<Lane> = page.entries.iter().map(|t| t.lane).collect();
        assert_eq!(
            lanes,
            vec![Lane::Express, Lane::Standard, Lane::Standard, Lane::Standard]
        );
    }

    #[tokio::test]
    async fn test_combined_boundary_crossing() {
        let engine = QueueEngine::new(ledger(0, 1, 3, 3));
        let page = engine.get_combined_page(1, 4).await.unwrap();
        assert_eq!(page.entries.len(), 4);
        assert_eq!(page.first_position(), 1);
        assert_eq!(
            page.lane_counts(),
            count_positions(1..5, 1, LaneCounts::new(3, 3).saturating_sub(LaneCounts::new(1, 0)))
        );
        // position 0 consumed express #0, so the page starts at standard #0
        let order: Vec<(Lane, u32)> = page.entries.iter().map(|t| (t.lane, t.entry.slot_id)).collect();
        assert_eq!(
            order,
            vec![
                (Lane::Standard, 0),
                (Lane::Express, 1),
                (Lane::Standard, 1),
                (Lane::Express, 2)
            ]
        );
    }

    #[tokio::test]
    async fn test_combined_past_end_is_empty() {
        let engine = QueueEngine::new(ledger(7, 2, 2, 2));
        let page = engine.get_combined_page(4, 10).await.unwrap();
        assert_eq!(page.total_length, 4);
        assert!(page.entries.is_empty());

        let empty = QueueEngine::new(MemoryLedger::default());
        let page = empty.get_combined_page(0, 10).await.unwrap();
        assert_eq!(page.total_length, 0);
        assert!(page.entries.is_empty());
    }

    #[tokio::test]
    async fn test_scans_are_bounded() {
        let engine = QueueEngine::new(ledger(0, 2, 10_000, 10_000));
        engine.get_combined_page(6, 3).await.unwrap();
        let scans = engine.ledger().scans();
        assert!(!scans.is_empty());
        for scan in scans {
            assert_eq!(scan.from, 0);
            assert!(scan.count <= 9, "{scan:?}");
        }
    }

    #[tokio::test]
    async fn test_ledger_failure_propagates() {
        let engine = QueueEngine::new(ledger(0, 2, 3, 3));
        engine.ledger().set_failing(true);
        let err = engine.get_combined_page(0, 2).await.unwrap_err();
        assert!(matches!(err, Error::Ledger(_)));
        assert!(err.to_string().contains("injected read failure"));
        assert!(!err.is_defect());
    }

    #[tokio::test]
    async fn test_unpinned_reads_use_latest() {
        let engine = QueueEngine::with_config(
            ledger(0, 2, 2, 2),
            EngineConfig::default().with_pinned_reads(false),
        );
        let page = engine.get_combined_page(0, 4).await.unwrap();
        assert_eq!(page.block, None);
        assert!(engine
            .ledger()
            .scans()
            .iter()
            .all(|scan| scan.at == ReadAt::Latest));
    }
}
