use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    chains::{client::ChainClientConfig, ChainClient, EvmClient},
    config::ChainRegistry,
    models::ChainId,
};

/// One read client per chain whose RPC endpoint could be resolved.
#[derive(Default, Clone)]
pub struct RpcClientRegistry {
    clients: HashMap<ChainId, Arc<dyn ChainClient>>,
}

impl RpcClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chains without a usable RPC URL are skipped, not reported as errors.
    pub fn from_chains(chains: &ChainRegistry, timeout: Duration) -> Self {
        let mut registry = Self::new();

        for chain_id in chains.chain_ids() {
            let Some(rpc_url) = chains.get(chain_id).and_then(|meta| meta.rpc_url.clone()) else {
                debug!("No RPC URL for chain {}, skipping", chain_id);
                continue;
            };

            let config = ChainClientConfig {
                chain_id: chain_id.clone(),
                rpc_url,
                timeout,
            };

            match EvmClient::new(config) {
                Ok(client) => {
                    registry.insert(Arc::new(client));
                }
                Err(e) => {
                    debug!("Skipping chain {}: {}", chain_id, e);
                }
            }
        }

        info!("Initialized RPC clients for {} chains", registry.len());
        registry
    }

    pub fn insert(&mut self, client: Arc<dyn ChainClient>) {
        self.clients.insert(client.chain_id(), client);
    }

    pub fn get_client(&self, chain: &ChainId) -> Option<Arc<dyn ChainClient>> {
        self.clients.get(chain).cloned()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
