use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque chain identifier, e.g. `"146"` for Sonic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Static deployment metadata for one chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainMetadata {
    pub name: String,
    pub rpc_url: Option<String>,
    pub subgraph: Option<String>,
    #[serde(default)]
    pub contracts: ContractAddresses,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractAddresses {
    pub x_stbl: Option<String>,
    pub revenue_router: Option<String>,
}
