use ethers::types::Address;
use std::collections::HashMap;
use std::str::FromStr;

use crate::models::{ChainId, ChainMetadata, EngineError, Result};

/// Contracts the adapters read from, looked up per chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
    XStbl,
    RevenueRouter,
}

impl Contract {
    pub fn as_str(&self) -> &'static str {
        match self {
            Contract::XStbl => "xSTBL",
            Contract::RevenueRouter => "RevenueRouter",
        }
    }
}

/// Read-only chain id -> deployment metadata lookup.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: HashMap<ChainId, ChainMetadata>,
}

impl ChainRegistry {
    pub fn new(chains: HashMap<ChainId, ChainMetadata>) -> Self {
        Self { chains }
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = &ChainId> {
        self.chains.keys()
    }

    pub fn get(&self, chain: &ChainId) -> Option<&ChainMetadata> {
        self.chains.get(chain)
    }

    pub fn subgraph_endpoints(&self) -> HashMap<ChainId, String> {
        self.chains
            .iter()
            .filter_map(|(id, meta)| meta.subgraph.clone().map(|url| (id.clone(), url)))
            .collect()
    }

    /// Resolve a contract address for `chain`.
    ///
    /// A missing or malformed address is a configuration error, never transient.
    pub fn contract_address(&self, chain: &ChainId, contract: Contract) -> Result<Address> {
        let missing = || EngineError::MissingContract {
            chain: chain.to_string(),
            contract: contract.as_str().to_string(),
        };

        let contracts = &self.chains.get(chain).ok_or_else(missing)?.contracts;
        let raw = match contract {
            Contract::XStbl => contracts.x_stbl.as_deref(),
            Contract::RevenueRouter => contracts.revenue_router.as_deref(),
        }
        .ok_or_else(missing)?;

        Address::from_str(raw).map_err(|_| {
            EngineError::Config(format!(
                "Invalid {} address on chain {}: {}",
                contract.as_str(),
                chain,
                raw
            ))
        })
    }
}
