use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_rpc_client::{ClientBuilder, RpcClient};
use alloy_rpc_types::{BlockNumberOrTag, TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use queue_core::{Lane, QueueCursor, QueueEntry, QueueLedger, ReadAt};
use tracing::{debug, info};

use crate::config::RpcConfig;
use crate::contracts::{
    contract_key, Contracts, ILinkedListStorage, IRocketDAOProtocolSettingsDeposit,
    IRocketDepositPool, IRocketMegapoolDelegate, IRocketStorage, DEPOSIT_POOL, DEPOSIT_SETTINGS,
    LINKED_LIST_STORAGE,
};
use crate::error::{Result, RpcError};

fn block_tag(at: ReadAt) -> BlockNumberOrTag {
    match at {
        ReadAt::Latest => BlockNumberOrTag::Latest,
        ReadAt::Block(number) => BlockNumberOrTag::Number(number),
    }
}

fn to_u64(value: U256, what: &'static str) -> Result<u64> {
    u64::try_from(value).map_err(|_| RpcError::OutOfRange { what, value })
}

/// Reads the deposit queue from an execution layer node
pub struct RocketPoolClient {
    client: RpcClient,
    contracts: Contracts,
}

impl RocketPoolClient {
    /// Connect and resolve the queue contracts through RocketStorage
    pub async fn connect(config: &RpcConfig) -> Result<Self> {
        config.validate()?;
        let client = ClientBuilder::default().connect(&config.rpc_url).await?;
        let storage = config.storage_address;

        let (linked_list, deposit_pool, deposit_settings) = futures::try_join!(
            Self::resolve(&client, storage, LINKED_LIST_STORAGE),
            Self::resolve(&client, storage, DEPOSIT_POOL),
            Self::resolve(&client, storage, DEPOSIT_SETTINGS),
        )?;

        let contracts = Contracts {
            storage,
            linked_list,
            deposit_pool,
            deposit_settings,
        };
        info!(
            rpc = %config.rpc_url,
            storage = %storage,
            linked_list = %linked_list,
            deposit_pool = %deposit_pool,
            deposit_settings = %deposit_settings,
            "Resolved deposit queue contracts"
        );

        Ok(Self { client, contracts })
    }

    pub fn contracts(&self) -> &Contracts {
        &self.contracts
    }

    async fn resolve(client: &RpcClient, storage: Address, name: &str) -> Result<Address> {
        let call = IRocketStorage::getAddressCall {
            key: contract_key(name),
        };
        let address = Self::call_with(client, storage, &call, ReadAt::Latest).await?;
        if address == Address::ZERO {
            return Err(RpcError::NotDeployed {
                name: name.to_string(),
                storage,
            });
        }
        Ok(address)
    }

    /// `eth_call` a view function and decode its return value
    async fn call_with<C: SolCall>(
        client: &RpcClient,
        to: Address,
        call: &C,
        at: ReadAt,
    ) -> Result<C::Return> {
        let tx = TransactionRequest::default()
            .to(to)
            .input(TransactionInput::new(call.abi_encode().into()));
        let output: Bytes = client.request("eth_call", (tx, block_tag(at))).await?;
        Ok(C::abi_decode_returns(&output)?)
    }

    async fn call<C: SolCall>(&self, to: Address, call: &C, at: ReadAt) -> Result<C::Return> {
        Self::call_with(&self.client, to, call, at).await
    }

    /// Get current block number
    pub async fn block_number(&self) -> Result<u64> {
        let block: U64 = self.client.request_noparams("eth_blockNumber").await?;
        Ok(block.to::<u64>())
    }

    /// Look up any contract registered in RocketStorage
    pub async fn contract_address(&self, name: &str) -> Result<Address> {
        Self::resolve(&self.client, self.contracts.storage, name).await
    }

    /// Node operator owning a megapool
    pub async fn megapool_node_address(&self, megapool: Address, at: ReadAt) -> Result<Address> {
        self.call(megapool, &IRocketMegapoolDelegate::getNodeAddressCall {}, at)
            .await
    }

    pub async fn lane_length_at(&self, lane: Lane, at: ReadAt) -> Result<u64> {
        let call = ILinkedListStorage::getLengthCall {
            listKey: B256::from(lane.namespace()),
        };
        let length = self.call(self.contracts.linked_list, &call, at).await?;
        to_u64(length, "lane length")
    }

    pub async fn lane_scan_at(
        &self,
        lane: Lane,
        from: u64,
        count: u64,
        at: ReadAt,
    ) -> Result<Vec<QueueEntry>> {
        let call = ILinkedListStorage::scanCall {
            listKey: B256::from(lane.namespace()),
            start: U256::from(from),
            count: U256::from(count),
        };
        let result = self.call(self.contracts.linked_list, &call, at).await?;
        debug!(
            %lane,
            from,
            count,
            returned = result.entries.len(),
            next_index = %result.nextIndex,
            "Scanned lane"
        );
        Ok(result.entries.into_iter().map(QueueEntry::from).collect())
    }

    pub async fn cursor_at(&self, at: ReadAt) -> Result<QueueCursor> {
        let (queue_index, rate) = futures::try_join!(
            self.call(
                self.contracts.deposit_pool,
                &IRocketDepositPool::getQueueIndexCall {},
                at
            ),
            self.call(
                self.contracts.deposit_settings,
                &IRocketDAOProtocolSettingsDeposit::getExpressQueueRateCall {},
                at
            ),
        )?;
        Ok(QueueCursor::new(
            to_u64(queue_index, "queue index")?,
            to_u64(rate, "express queue rate")?,
        ))
    }
}

impl QueueLedger for RocketPoolClient {
    async fn head_block(&self) -> anyhow::Result<u64> {
        Ok(self.block_number().await?)
    }

    async fn lane_length(&self, lane: Lane, at: ReadAt) -> anyhow::Result<u64> {
        Ok(self.lane_length_at(lane, at).await?)
    }

    async fn lane_scan(
        &self,
        lane: Lane,
        from: u64,
        count: u64,
        at: ReadAt,
    ) -> anyhow::Result<Vec<QueueEntry>> {
        Ok(self.lane_scan_at(lane, from, count, at).await?)
    }

    async fn combined_cursor(&self, at: ReadAt) -> anyhow::Result<QueueCursor> {
        Ok(self.cursor_at(at).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_tag() {
        assert_eq!(block_tag(ReadAt::Latest), BlockNumberOrTag::Latest);
        assert_eq!(block_tag(ReadAt::Block(21_000_000)), BlockNumberOrTag::Number(21_000_000));
    }

    #[test]
    fn test_to_u64_bounds() {
        assert_eq!(to_u64(U256::from(42u64), "x").unwrap(), 42);
        assert!(matches!(
            to_u64(U256::from(u64::MAX) + U256::from(1u64), "x"),
            Err(RpcError::OutOfRange { what: "x", .. })
        ));
    }
}
