use async_trait::async_trait;
use futures::{future::join_all, FutureExt};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    dao::{DaoAdapter, DaoFactory},
    models::{DaoDescriptor, OnChainData, Result, RevenueChart},
};

/// One adapter operation whose result is cached per DAO.
#[async_trait]
pub trait DaoMetric: Send + Sync + 'static {
    type Value: Default + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    async fn fetch(&self, adapter: &dyn DaoAdapter) -> Result<Self::Value>;
}

pub struct RevenueMetric;

#[async_trait]
impl DaoMetric for RevenueMetric {
    type Value = RevenueChart;

    fn name(&self) -> &'static str {
        "revenue chart"
    }

    async fn fetch(&self, adapter: &dyn DaoAdapter) -> Result<RevenueChart> {
        adapter.revenue_chart().await
    }
}

pub struct OnChainMetric;

#[async_trait]
impl DaoMetric for OnChainMetric {
    type Value = OnChainData;

    fn name(&self) -> &'static str {
        "on-chain data"
    }

    async fn fetch(&self, adapter: &dyn DaoAdapter) -> Result<OnChainData> {
        adapter.onchain_data().await
    }
}

/// Outcome of one refresh cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub updated: usize,
    /// DAOs without an adapter, published as empty
    pub empty: usize,
    /// DAOs that kept their previous value
    pub failed: usize,
    pub elapsed: Duration,
}

enum DaoOutcome {
    Updated,
    Empty,
    Failed,
}

/// Last published value per DAO symbol.
///
/// Reads never block on a refresh and never trigger one. Each DAO's entry is
/// swapped as a whole, so readers see either the previous value or the next.
pub struct MetricCache<M: DaoMetric> {
    metric: M,
    published: RwLock<HashMap<String, Arc<M::Value>>>,
    refresh_guard: Mutex<()>,
}

pub type RevenueCache = MetricCache<RevenueMetric>;
pub type OnChainDataCache = MetricCache<OnChainMetric>;

impl RevenueCache {
    pub fn revenue() -> Self {
        Self::new(RevenueMetric)
    }
}

impl OnChainDataCache {
    pub fn onchain() -> Self {
        Self::new(OnChainMetric)
    }
}

impl<M: DaoMetric> MetricCache<M> {
    pub fn new(metric: M) -> Self {
        Self {
            metric,
            published: RwLock::new(HashMap::new()),
            refresh_guard: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.metric.name()
    }

    pub fn get(&self, symbol: &str) -> Option<Arc<M::Value>> {
        let published = self.published.read().ok()?;
        published.get(symbol).cloned()
    }

    pub fn publish(&self, symbol: String, value: M::Value) {
        if let Ok(mut published) = self.published.write() {
            published.insert(symbol, Arc::new(value));
        }
    }

    pub fn len(&self) -> usize {
        self.published.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_guard.try_lock().is_err()
    }

    /// Run one refresh cycle over `daos`.
    ///
    /// A trigger that arrives while a cycle is in flight waits for it to
    /// finish and then runs its own; cycles never overlap.
    pub async fn refresh(&self, daos: &[DaoDescriptor], factory: &DaoFactory) -> RefreshReport {
        let _guard = self.refresh_guard.lock().await;
        let started = Instant::now();

        info!("Refreshing {} for {} DAOs", self.name(), daos.len());

        let outcomes = join_all(
            daos.iter()
                .map(|dao| self.refresh_dao_isolated(dao, factory)),
        )
        .await;

        let mut report = RefreshReport::default();
        for outcome in outcomes {
            match outcome {
                DaoOutcome::Updated => report.updated += 1,
                DaoOutcome::Empty => report.empty += 1,
                DaoOutcome::Failed => report.failed += 1,
            }
        }
        report.elapsed = started.elapsed();

        info!(
            "Refreshed {}: {} updated, {} empty, {} failed in {:?}",
            self.name(),
            report.updated,
            report.empty,
            report.failed,
            report.elapsed
        );
        report
    }

    /// A panicking adapter costs only its own DAO this cycle.
    async fn refresh_dao_isolated(&self, dao: &DaoDescriptor, factory: &DaoFactory) -> DaoOutcome {
        match AssertUnwindSafe(self.refresh_dao(dao, factory))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Adapter for {} panicked while refreshing {}", dao.symbol, self.name());
                DaoOutcome::Failed
            }
        }
    }

    async fn refresh_dao(&self, dao: &DaoDescriptor, factory: &DaoFactory) -> DaoOutcome {
        let adapter = match factory.create(dao) {
            Ok(Some(adapter)) => adapter,
            Ok(None) => {
                self.publish(dao.symbol.clone(), M::Value::default());
                return DaoOutcome::Empty;
            }
            Err(e) => {
                error!("Cannot refresh {} for {}: {}", self.name(), dao.symbol, e);
                return DaoOutcome::Failed;
            }
        };

        match self.metric.fetch(adapter.as_ref()).await {
            Ok(value) => {
                self.publish(dao.symbol.clone(), value);
                DaoOutcome::Updated
            }
            Err(e) if e.is_transient() => {
                warn!("Failed to refresh {} for {}: {}", self.name(), dao.symbol, e);
                DaoOutcome::Failed
            }
            Err(e) => {
                error!("Failed to refresh {} for {}: {}", self.name(), dao.symbol, e);
                DaoOutcome::Failed
            }
        }
    }
}
