//! JSON-RPC ledger for the Rocket Pool deposit queue
//!
//! Implements [`queue_core::QueueLedger`] with `eth_call`s against:
//! 1. `linkedListStorage` for lane lengths and head scans
//! 2. `rocketDepositPool` for the queue index
//! 3. `rocketDAOProtocolSettingsDeposit` for the express queue rate
//!
//! Contract addresses are resolved once through RocketStorage at connect time.
//!
//! ## Usage
//!
//! ```no_run
//! use queue_core::QueueEngine;
//! use queue_rpc::{RocketPoolClient, RpcConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RpcConfig::default();
//!     let client = RocketPoolClient::connect(&config).await?;
//!     let engine = QueueEngine::with_config(client, config.engine.clone());
//!     let page = engine.get_combined_page(0, config.page_size).await?;
//!     println!("{} validators queued", page.total_length);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
pub mod contracts;
mod error;

pub use client::RocketPoolClient;
pub use config::{RpcConfig, DEFAULT_PAGE_SIZE, MAINNET_ROCKET_STORAGE};
pub use contracts::Contracts;
pub use error::{Result, RpcError};
