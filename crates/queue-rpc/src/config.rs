//! Connection configuration for the queue reader

use alloy_primitives::{address, Address};
use queue_core::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RpcError};

/// RocketStorage on Ethereum mainnet
pub const MAINNET_ROCKET_STORAGE: Address = address!("1d8f8f00cfa6758d7be78336684788fb0ee0fa46");

/// Entries per page in queue views
pub const DEFAULT_PAGE_SIZE: u64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Execution layer JSON-RPC endpoint
    pub rpc_url: String,
    /// RocketStorage contract all other addresses are resolved through
    #[serde(default = "default_storage_address")]
    pub storage_address: Address,
    /// Entries per page
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Engine options, stored inline (`pin_reads`)
    #[serde(flatten)]
    pub engine: EngineConfig,
}

fn default_storage_address() -> Address {
    MAINNET_ROCKET_STORAGE
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".into(),
            storage_address: default_storage_address(),
            page_size: default_page_size(),
            engine: EngineConfig::default(),
        }
    }
}

impl RpcConfig {
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn with_storage_address(mut self, storage_address: Address) -> Self {
        self.storage_address = storage_address;
        self
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(RpcError::InvalidConfig("page_size must be greater than zero".into()));
        }
        if self.storage_address == Address::ZERO {
            return Err(RpcError::InvalidConfig("storage_address is the zero address".into()));
        }
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
