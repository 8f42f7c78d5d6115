//! Lane identifier for the two-lane deposit queue

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

/// Lane identifier
///
/// The deposit queue is split into two independently ordered linked lists:
/// - Express: validators paid for with express tickets, `rate` slots per cycle
/// - Standard: everything else, one slot per cycle
///
/// Both lanes live in the same `linkedListStorage` contract and are told
/// apart only by their namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Express,
    Standard,
}

impl Lane {
    pub const ALL: [Lane; 2] = [Lane::Express, Lane::Standard];

    /// Storage key hashed into the lane namespace
    pub fn namespace_key(&self) -> &'static str {
        match self {
            Lane::Express => "deposit.queue.express",
            Lane::Standard => "deposit.queue.standard",
        }
    }

    /// `keccak256(namespace_key)`, the namespace argument of the list contract
    pub fn namespace(&self) -> [u8; 32] {
        let mut hasher = Keccak::v256();
        hasher.update(self.namespace_key().as_bytes());
        let mut out = [0u8; 32];
        hasher.finalize(&mut out);
        out
    }

    pub fn namespace_hex(&self) -> String {
        format!("0x{}", hex::encode(self.namespace()))
    }

    /// Human readable title for queue views
    pub fn label(&self) -> &'static str {
        match self {
            Lane::Express => "Validator Express Queue",
            Lane::Standard => "Validator Standard Queue",
        }
    }

    /// The lane that takes over when this one is exhausted
    pub fn other(&self) -> Lane {
        match self {
            Lane::Express => Lane::Standard,
            Lane::Standard => Lane::Express,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lane::Express => write!(f, "express"),
            Lane::Standard => write!(f, "standard"),
        }
    }
}

impl FromStr for Lane {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "express" => Ok(Lane::Express),
            "standard" => Ok(Lane::Standard),
            other => Err(crate::Error::UnknownLane(other.to_string())),
        }
    }
}
