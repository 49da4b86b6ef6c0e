use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not implemented: {name}-{symbol}")]
    AdapterNotImplemented { name: String, symbol: String },

    #[error("{contract} address not found for chain {chain}")]
    MissingContract { chain: String, contract: String },

    #[error("Subgraph not found for chainId {0}")]
    SubgraphNotFound(String),

    #[error("Subgraph query failed on {chain}: {message}")]
    Subgraph { chain: String, message: String },

    #[error("RPC error on {chain}: {message}")]
    Rpc { chain: String, message: String },

    #[error("RPC client not found for chain {0}")]
    RpcClientNotFound(String),

    #[error("Request timed out for {chain}")]
    Timeout { chain: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Transient errors cost one chain or one DAO its contribution for the
    /// current cycle. Everything else is a configuration problem.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            EngineError::Config(_)
                | EngineError::AdapterNotImplemented { .. }
                | EngineError::MissingContract { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
