use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{transaction::eip2718::TypedTransaction, Address, TransactionRequest, U256},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::{
    chains::{client::ChainClientConfig, ChainClient, ContractCall},
    models::{ChainId, EngineError, Result},
};

pub struct EvmClient {
    provider: Arc<Provider<Http>>,
    chain_id: ChainId,
    timeout: Duration,
}

impl EvmClient {
    /// Build a client without touching the network; a dead endpoint only
    /// shows up as failed reads later.
    pub fn new(config: ChainClientConfig) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| EngineError::Config(format!("Invalid RPC URL: {}", e)))?;

        Ok(Self {
            provider: Arc::new(provider),
            chain_id: config.chain_id,
            timeout: config.timeout,
        })
    }

    fn rpc_error(&self, message: String) -> EngineError {
        EngineError::Rpc {
            chain: self.chain_id.to_string(),
            message,
        }
    }
}

#[async_trait]
impl ChainClient for EvmClient {
    fn chain_id(&self) -> ChainId {
        self.chain_id.clone()
    }

    async fn read_uint(&self, contract: Address, call: ContractCall) -> Result<U256> {
        let tx: TypedTransaction = TransactionRequest::new()
            .to(contract)
            .data(call.calldata())
            .into();

        debug!("eth_call {} on {:?} ({})", call.signature(), contract, self.chain_id);

        let result = tokio::time::timeout(self.timeout, self.provider.call(&tx, None))
            .await
            .map_err(|_| EngineError::Timeout {
                chain: self.chain_id.to_string(),
            })?
            .map_err(|e| self.rpc_error(format!("Failed to call {}: {}", call.signature(), e)))?;

        if result.len() < 32 {
            return Err(self.rpc_error(format!(
                "{} returned {} bytes, expected a uint256",
                call.signature(),
                result.len()
            )));
        }

        Ok(U256::from_big_endian(&result[..32]))
    }
}
