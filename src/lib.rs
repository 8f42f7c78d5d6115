//! deposit-queue: paged views of the Rocket Pool deposit queue
//!
//! Re-exports the workspace crates so integration tests and downstream users
//! can depend on a single package.

pub use queue_core as core;
pub use queue_rpc as rpc;
