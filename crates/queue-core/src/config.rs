//! Engine configuration

use serde::{Deserialize, Serialize};

/// Options for [`QueueEngine`](crate::QueueEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pin every read of a request to the head block observed at its start
    ///
    /// Without pinning each read observes latest independently and a page
    /// may mix state from different blocks.
    #[serde(default = "default_pin_reads")]
    pub pin_reads: bool,
}

fn default_pin_reads() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pin_reads: default_pin_reads(),
        }
    }
}

impl EngineConfig {
    pub fn with_pinned_reads(mut self, enabled: bool) -> Self {
        self.pin_reads = enabled;
        self
    }
}
