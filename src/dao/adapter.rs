use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    chains::RpcClientRegistry,
    config::ChainRegistry,
    models::{DaoDescriptor, OnChainData, Result, RevenueChart},
    subgraph::SubgraphClient,
};

/// Per-DAO source of revenue history and live staking metrics.
///
/// Both operations return an empty value, without any network access, when
/// the DAO is not live.
#[async_trait]
pub trait DaoAdapter: Send + Sync {
    fn dao(&self) -> &DaoDescriptor;

    async fn revenue_chart(&self) -> Result<RevenueChart>;

    async fn onchain_data(&self) -> Result<OnChainData>;
}

/// Returns the current UNIX time in seconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| Utc::now().timestamp())
}

/// Shared handles every adapter is constructed with.
#[derive(Clone)]
pub struct AdapterContext {
    pub subgraph: Arc<SubgraphClient>,
    pub rpc: Arc<RpcClientRegistry>,
    pub chains: Arc<ChainRegistry>,
    pub onchain_read_delay: Duration,
    pub clock: Clock,
}

impl AdapterContext {
    pub fn new(
        subgraph: Arc<SubgraphClient>,
        rpc: Arc<RpcClientRegistry>,
        chains: Arc<ChainRegistry>,
    ) -> Self {
        Self {
            subgraph,
            rpc,
            chains,
            onchain_read_delay: Duration::from_secs(3),
            clock: system_clock(),
        }
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.onchain_read_delay = delay;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> i64 {
        (self.clock)()
    }
}
