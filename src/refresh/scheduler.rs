use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::{
    dao::DaoFactory,
    models::DaoDescriptor,
    refresh::cache::{DaoMetric, MetricCache, RefreshReport},
};

/// Drives one cache: a refresh at startup, then one per interval.
pub struct RefreshScheduler<M: DaoMetric> {
    cache: Arc<MetricCache<M>>,
    factory: Arc<DaoFactory>,
    daos: Arc<Vec<DaoDescriptor>>,
    interval: Duration,
}

impl<M: DaoMetric> Clone for RefreshScheduler<M> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            factory: self.factory.clone(),
            daos: self.daos.clone(),
            interval: self.interval,
        }
    }
}

impl<M: DaoMetric> RefreshScheduler<M> {
    pub fn new(
        cache: Arc<MetricCache<M>>,
        factory: Arc<DaoFactory>,
        daos: Arc<Vec<DaoDescriptor>>,
        interval: Duration,
    ) -> Self {
        Self {
            cache,
            factory,
            daos,
            interval,
        }
    }

    pub fn cache(&self) -> &Arc<MetricCache<M>> {
        &self.cache
    }

    /// Run one cycle on its own task so the loop outlives anything that
    /// escapes the cache's per-DAO panic handling.
    pub async fn run_once(&self) -> Option<RefreshReport> {
        let cache = self.cache.clone();
        let factory = self.factory.clone();
        let daos = self.daos.clone();

        let task = tokio::spawn(async move { cache.refresh(&daos, &factory).await });

        match task.await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("{} refresh aborted: {}", self.cache.name(), e);
                None
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Scheduling {} refresh every {:?}",
                self.cache.name(),
                self.interval
            );

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // first tick completes immediately: the startup refresh
                ticker.tick().await;
                self.run_once().await;
            }
        })
    }
}
