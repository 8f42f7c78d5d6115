//! Terminal views of the deposit queue
//!
//! Thin layer over [`queue_core::QueueEngine`]: page navigation that copes
//! with a queue moving underneath it, and text rendering with node operator
//! labels looked up per page.

pub mod pager;
pub mod render;

use std::collections::HashSet;

use alloy_primitives::Address;
use queue_core::ReadAt;
use queue_rpc::RocketPoolClient;
use tracing::warn;

pub use pager::{Pager, PagerView, Paged};
pub use render::NodeMap;

/// Look up the node operator of each megapool on a page
///
/// Failed lookups are logged and left out so the megapool address is shown
/// instead.
pub async fn resolve_nodes(
    client: &RocketPoolClient,
    megapools: impl IntoIterator<Item = Address>,
    block: Option<u64>,
) -> NodeMap {
    let at = block.map(ReadAt::Block).unwrap_or_default();
    let unique: HashSet<Address> = megapools.into_iter().collect();

    let lookups = unique.into_iter().map(|megapool| async move {
        (megapool, client.megapool_node_address(megapool, at).await)
    });

    let mut nodes = NodeMap::new();
    for (megapool, result) in futures::future::join_all(lookups).await {
        match result {
            Ok(node) => {
                nodes.insert(megapool, node);
            }
            Err(e) => warn!(%megapool, error = %e, "Failed to resolve megapool node"),
        }
    }
    nodes
}
