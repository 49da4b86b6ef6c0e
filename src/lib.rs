pub mod chains;
pub mod config;
pub mod dao;
pub mod engine;
pub mod models;
pub mod refresh;
pub mod subgraph;
pub mod utils;

pub use config::Settings;
pub use dao::{DaoAdapter, DaoFactory, StblAdapter};
pub use engine::{DaoMetricsView, Engine};
pub use models::{
    ChainId, DaoDescriptor, EngineError, LifecyclePhase, OnChainData, OnChainSnapshot, Result,
    RevenueChart,
};

// Re-export commonly used types
pub use bigdecimal::BigDecimal;
