//! Error types for queue-rpc

use alloy_primitives::{Address, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Transport error: {0}")]
    Transport(#[from] alloy_transport::TransportError),

    #[error("ABI decode error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Contract {name} is not deployed (RocketStorage {storage})")]
    NotDeployed { name: String, storage: Address },

    #[error("{what} does not fit in 64 bits: {value}")]
    OutOfRange { what: &'static str, value: U256 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RpcError>;
