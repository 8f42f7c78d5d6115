//! Page navigation over a queue that can shrink between loads
//!
//! The engine reports an empty window together with the true queue length
//! when a page starts past the end. The pager uses that to snap back to the
//! last page that still exists and load it again.

use std::future::Future;

use queue_core::{CombinedPage, LanePage};

/// Attempts to land on a valid page before giving up on a moving queue
const MAX_RELOADS: usize = 3;

/// Anything with a queue length the pager can bound itself against
pub trait Paged {
    fn total_length(&self) -> u64;
    fn is_empty(&self) -> bool;
}

impl Paged for LanePage {
    fn total_length(&self) -> u64 {
        self.total_length
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Paged for CombinedPage {
    fn total_length(&self) -> u64 {
        self.total_length
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of loading the current page
#[derive(Debug)]
pub enum PagerView<P> {
    /// Nothing is queued
    Empty,
    Page {
        page: P,
        page_index: u64,
        has_prev: bool,
        has_next: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: u64,
    page_index: u64,
}

impl Pager {
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size: page_size.max(1),
            page_index: 0,
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn set_page_index(&mut self, page_index: u64) {
        self.page_index = page_index;
    }

    /// Offset of the first entry on the current page
    pub fn start(&self) -> u64 {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Page holding a 1-based queue position
    pub fn position_to_page_index(&self, position: u64) -> u64 {
        position.saturating_sub(1) / self.page_size
    }

    pub fn jump_to_position(&mut self, position: u64) {
        self.page_index = self.position_to_page_index(position);
    }

    pub fn next(&mut self) {
        self.page_index = self.page_index.saturating_add(1);
    }

    pub fn prev(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    /// Load the current page, snapping to the last page if the queue shrank
    pub async fn load<P, F, Fut>(&mut self, mut loader: F) -> queue_core::Result<PagerView<P>>
    where
        P: Paged,
        F: FnMut(u64, u64) -> Fut,
        Fut: Future<Output = queue_core::Result<P>>,
    {
        let mut attempts = 0;
        loop {
            let page = loader(self.start(), self.page_size).await?;
            let total = page.total_length();
            if total == 0 {
                self.page_index = 0;
                return Ok(PagerView::Empty);
            }

            let max_page_index = self.position_to_page_index(total);
            attempts += 1;
            if self.page_index > max_page_index && attempts < MAX_RELOADS {
                tracing::debug!(
                    page_index = self.page_index,
                    max_page_index,
                    total,
                    "Page out of range, reloading last page"
                );
                self.page_index = max_page_index;
                continue;
            }

            return Ok(PagerView::Page {
                page_index: self.page_index,
                has_prev: self.page_index > 0,
                has_next: self.page_index < max_page_index,
                page,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use queue_core::{Lane, MemoryLedger, QueueEngine, QueueEntry, QueueState};
    use alloy_primitives::Address;

    fn engine(express: u32, standard: u32) -> QueueEngine<MemoryLedger> {
        let mut state = QueueState::new(0, 2);
        for id in 0..express {
            state.enqueue(Lane::Express, QueueEntry::new(Address::repeat_byte(1), id, 4_000, 32_000));
        }
        for id in 0..standard {
            state.enqueue(Lane::Standard, QueueEntry::new(Address::repeat_byte(2), id, 4_000, 32_000));
        }
        QueueEngine::new(MemoryLedger::new(state))
    }

    #[test]
    fn test_position_to_page_index() {
        let pager = Pager::new(15);
        assert_eq!(pager.position_to_page_index(1), 0);
        assert_eq!(pager.position_to_page_index(15), 0);
        assert_eq!(pager.position_to_page_index(16), 1);
        assert_eq!(pager.position_to_page_index(0), 0);
    }

    #[test]
    fn test_navigation_saturates() {
        let mut pager = Pager::new(10);
        pager.prev();
        assert_eq!(pager.page_index(), 0);
        pager.next();
        pager.next();
        assert_eq!(pager.start(), 20);
        pager.jump_to_position(35);
        assert_eq!(pager.page_index(), 3);
    }

    #[tokio::test]
    async fn test_snaps_back_to_last_page() {
        let engine = engine(10, 10);
        let mut pager = Pager::new(15);
        pager.set_page_index(5);

        let view = pager
            .load(|start, limit| engine.get_combined_page(start, limit))
            .await
            .unwrap();
        match view {
            PagerView::Page {
                page,
                page_index,
                has_prev,
                has_next,
            } => {
                assert_eq!(page_index, 1);
                assert_eq!(page.start, 15);
                assert_eq!(page.entries.len(), 5);
                assert!(has_prev);
                assert!(!has_next);
            }
            PagerView::Empty => panic!("queue is not empty"),
        }
        assert_eq!(pager.page_index(), 1);
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let engine = engine(0, 0);
        let mut pager = Pager::new(15);
        pager.set_page_index(2);

        let view = pager
            .load(|start, limit| engine.get_lane_page(Lane::Express, start, limit))
            .await
            .unwrap();
        assert!(matches!(view, PagerView::Empty));
        assert_eq!(pager.page_index(), 0);
    }

    #[tokio::test]
    async fn test_first_page_has_next() {
        let engine = engine(20, 0);
        let mut pager = Pager::new(15);

        let view = pager
            .load(|start, limit| engine.get_lane_page(Lane::Express, start, limit))
            .await
            .unwrap();
        match view {
            PagerView::Page {
                page,
                has_prev,
                has_next,
                ..
            } => {
                assert_eq!(page.entries.len(), 15);
                assert!(!has_prev);
                assert!(has_next);
            }
            PagerView::Empty => panic!("queue is not empty"),
        }
    }
}
