pub mod cache;
pub mod scheduler;

pub use cache::{
    DaoMetric, MetricCache, OnChainDataCache, OnChainMetric, RefreshReport, RevenueCache,
    RevenueMetric,
};
pub use scheduler::RefreshScheduler;
