use async_trait::async_trait;
use ethers::{
    abi::{self, Token},
    types::{Address, U256},
    utils::id,
};
use std::time::Duration;

use crate::models::{ChainId, Result};

/// Read-only access to contract state on one chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Get the chain this client is for
    fn chain_id(&self) -> ChainId;

    /// Execute a view call that returns a single `uint256`
    async fn read_uint(&self, contract: Address, call: ContractCall) -> Result<U256>;
}

/// The view functions the adapters need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractCall {
    /// `pendingRebase()` on xSTBL
    PendingRebase,
    /// `pendingRevenue()` or `pendingRevenue(uint256)` on the revenue router
    PendingRevenue { unit_index: Option<u64> },
    /// `totalSupply()` on xSTBL
    TotalSupply,
}

impl ContractCall {
    pub fn signature(&self) -> &'static str {
        match self {
            ContractCall::PendingRebase => "pendingRebase()",
            ContractCall::PendingRevenue { unit_index: None } => "pendingRevenue()",
            ContractCall::PendingRevenue { unit_index: Some(_) } => "pendingRevenue(uint256)",
            ContractCall::TotalSupply => "totalSupply()",
        }
    }

    pub fn calldata(&self) -> Vec<u8> {
        let mut data = id(self.signature()).to_vec();
        if let ContractCall::PendingRevenue { unit_index: Some(index) } = self {
            data.extend(abi::encode(&[Token::Uint(U256::from(*index))]));
        }
        data
    }
}

/// Configuration for chain clients
#[derive(Debug, Clone)]
pub struct ChainClientConfig {
    pub chain_id: ChainId,
    pub rpc_url: String,
    pub timeout: Duration,
}
