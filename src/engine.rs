use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    chains::RpcClientRegistry,
    config::{ChainRegistry, Settings},
    dao::{AdapterContext, DaoFactory},
    models::{DaoDescriptor, OnChainData, Result, RevenueChart},
    refresh::{
        OnChainDataCache, OnChainMetric, RefreshReport, RefreshScheduler, RevenueCache,
        RevenueMetric,
    },
    subgraph::SubgraphClient,
};

/// Everything the read API exposes for one DAO.
///
/// Missing data shows up as empty values, never as an error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DaoMetricsView {
    pub revenue_chart: RevenueChart,
    pub on_chain_data: OnChainData,
}

/// Wires the registries, the adapter factory and both caches together.
pub struct Engine {
    settings: Settings,
    daos: Arc<Vec<DaoDescriptor>>,
    factory: Arc<DaoFactory>,
    revenue: Arc<RevenueCache>,
    onchain: Arc<OnChainDataCache>,
}

impl Engine {
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let chains = Arc::new(ChainRegistry::new(settings.chains.clone()));
        let rpc = Arc::new(RpcClientRegistry::from_chains(
            &chains,
            settings.refresh.rpc_timeout(),
        ));
        let subgraph = Arc::new(SubgraphClient::from_settings(&chains, &settings.subgraph)?);

        let context = AdapterContext::new(subgraph, rpc, chains)
            .with_read_delay(settings.refresh.onchain_read_delay());

        Ok(Self::new(settings, DaoFactory::new(context)))
    }

    pub fn new(settings: Settings, factory: DaoFactory) -> Self {
        let daos = Arc::new(settings.daos.clone());

        Self {
            settings,
            daos,
            factory: Arc::new(factory),
            revenue: Arc::new(RevenueCache::revenue()),
            onchain: Arc::new(OnChainDataCache::onchain()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn factory(&self) -> &DaoFactory {
        &self.factory
    }

    pub fn daos(&self) -> &[DaoDescriptor] {
        &self.daos
    }

    pub fn dao(&self, symbol: &str) -> Option<&DaoDescriptor> {
        self.daos.iter().find(|dao| dao.symbol == symbol)
    }

    pub fn revenue_scheduler(&self) -> RefreshScheduler<RevenueMetric> {
        RefreshScheduler::new(
            self.revenue.clone(),
            self.factory.clone(),
            self.daos.clone(),
            self.settings.refresh.revenue_interval(),
        )
    }

    pub fn onchain_scheduler(&self) -> RefreshScheduler<OnChainMetric> {
        RefreshScheduler::new(
            self.onchain.clone(),
            self.factory.clone(),
            self.daos.clone(),
            self.settings.refresh.onchain_interval(),
        )
    }

    /// Spawn both refresh loops; each refreshes immediately, then on its interval.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        info!("Starting refresh schedulers for {} DAOs", self.daos.len());
        vec![self.revenue_scheduler().spawn(), self.onchain_scheduler().spawn()]
    }

    /// Refresh both caches once, concurrently.
    pub async fn refresh_all(&self) -> (RefreshReport, RefreshReport) {
        tokio::join!(
            self.revenue.refresh(&self.daos, &self.factory),
            self.onchain.refresh(&self.daos, &self.factory)
        )
    }

    pub fn revenue_chart(&self, symbol: &str) -> Option<Arc<RevenueChart>> {
        self.revenue.get(symbol)
    }

    pub fn onchain_data(&self, symbol: &str) -> Option<Arc<OnChainData>> {
        self.onchain.get(symbol)
    }

    pub fn dao_metrics(&self, symbol: &str) -> DaoMetricsView {
        DaoMetricsView {
            revenue_chart: self
                .revenue_chart(symbol)
                .map(|chart| chart.as_ref().clone())
                .unwrap_or_default(),
            on_chain_data: self
                .onchain_data(symbol)
                .map(|data| data.as_ref().clone())
                .unwrap_or_default(),
        }
    }

    /// Composed view over every configured DAO.
    pub fn memory(&self) -> BTreeMap<String, DaoMetricsView> {
        self.daos
            .iter()
            .map(|dao| (dao.symbol.clone(), self.dao_metrics(&dao.symbol)))
            .collect()
    }
}
