//! Rocket Pool contract bindings used by the queue reader

use alloy_primitives::{keccak256, Address, B256};
use alloy_sol_types::sol;
use queue_core::QueueEntry;

sol! {
    /// Element of a deposit queue list
    struct DepositQueueValue {
        address receiver;
        uint32 validatorId;
        uint32 suppliedValue;
        uint32 requestedValue;
    }

    interface IRocketStorage {
        function getAddress(bytes32 key) external view returns (address);
    }

    interface ILinkedListStorage {
        function getLength(bytes32 listKey) external view returns (uint256);
        function scan(bytes32 listKey, uint256 start, uint256 count)
            external view returns (DepositQueueValue[] memory entries, uint256 nextIndex);
    }

    interface IRocketDepositPool {
        function getQueueIndex() external view returns (uint256);
    }

    interface IRocketDAOProtocolSettingsDeposit {
        function getExpressQueueRate() external view returns (uint256);
    }

    interface IRocketMegapoolDelegate {
        function getNodeAddress() external view returns (address);
    }
}

pub const LINKED_LIST_STORAGE: &str = "linkedListStorage";
pub const DEPOSIT_POOL: &str = "rocketDepositPool";
pub const DEPOSIT_SETTINGS: &str = "rocketDAOProtocolSettingsDeposit";

/// RocketStorage key under which a contract's address is registered
///
/// `keccak256(abi.encodePacked("contract.address", name))`
pub fn contract_key(name: &str) -> B256 {
    let mut packed = Vec::with_capacity(16 + name.len());
    packed.extend_from_slice(b"contract.address");
    packed.extend_from_slice(name.as_bytes());
    keccak256(packed)
}

/// Addresses of the contracts the queue reader talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contracts {
    pub storage: Address,
    pub linked_list: Address,
    pub deposit_pool: Address,
    pub deposit_settings: Address,
}

impl From<DepositQueueValue> for QueueEntry {
    fn from(value: DepositQueueValue) -> Self {
        QueueEntry::new(
            value.receiver,
            value.validatorId,
            value.suppliedValue,
            value.requestedValue,
        )
    }
}
