//! queue-core: Paging the two-lane Rocket Pool deposit queue
//!
//! Validators wait for deposit assignment in two linked lists:
//! - Express lane: served `rate` times per cycle
//! - Standard lane: served once per cycle
//!
//! The deposit pool walks a single virtual index over both lanes. Position
//! `p` belongs to the standard lane when `p % (rate + 1) == rate` and to the
//! express lane otherwise; an empty lane hands its slot to the other one.
//!
//! The lists live on chain and can only be scanned from their head, so this
//! crate rebuilds any page of the combined order from two bounded scans:
//!
//! 1. Read both lane lengths and the cursor `(queue_index, rate)`
//! 2. Count how many entries of each lane precede the page ([`interval`])
//! 3. Count how many entries of each lane fall inside the page
//! 4. Scan `skip + fetch` entries from the head of each lane
//! 5. Interleave the two windows position by position ([`interleave`])
//!
//! Nothing is cached between requests; see [`QueueEngine`].

mod config;
mod engine;
mod entry;
mod error;
pub mod interleave;
pub mod interval;
mod lane;
mod ledger;
mod memory;

pub use config::EngineConfig;
pub use engine::{CombinedPage, LanePage, QueueEngine, QueueStatus, WindowPlan};
pub use entry::{QueueCursor, QueueEntry, TaggedEntry};
pub use error::Error;
pub use interval::LaneCounts;
pub use lane::Lane;
pub use ledger::{QueueLedger, ReadAt};
pub use memory::{MemoryLedger, QueueState, ScanRecord};

pub type Result<T> = std::result::Result<T, Error>;
