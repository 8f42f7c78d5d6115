//! Error types for queue-core

use thiserror::Error;

use crate::Lane;

#[derive(Error, Debug)]
pub enum Error {
    /// A read against the remote ledger failed; the transport error is kept as is
    #[error(transparent)]
    Ledger(#[from] anyhow::Error),

    #[error("Invalid page limit: {0} (must be greater than zero)")]
    InvalidLimit(u64),

    #[error("Virtual position overflow: queue index {queue_index} + offset {offset}")]
    PositionOverflow { queue_index: u64, offset: u64 },

    #[error("Unknown lane: {0}")]
    UnknownLane(String),

    #[error(
        "Interleave ran out of entries at output position {position} of {expected} \
         (express buffered {express}, standard buffered {standard})"
    )]
    InterleaveExhausted {
        position: u64,
        expected: u64,
        express: u64,
        standard: u64,
    },

    #[error("Lane {lane} scan returned {actual} entries at a pinned block, expected {expected}")]
    ScanShortfall {
        lane: Lane,
        expected: u64,
        actual: u64,
    },

    #[error("Lane {lane} scan returned {actual} entries, more than the {requested} requested")]
    ScanOverrun {
        lane: Lane,
        requested: u64,
        actual: u64,
    },
}

impl Error {
    /// Accounting and fetching disagreed; indicates a bug, never bad input
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            Error::InterleaveExhausted { .. }
                | Error::ScanOverrun { .. }
                | Error::ScanShortfall { .. }
        )
    }

    /// Rejected before any remote read was issued
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidLimit(_) | Error::UnknownLane(_))
    }
}
