use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use crate::models::{ChainId, ChainMetadata, DaoDescriptor};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub refresh: RefreshSettings,
    pub subgraph: SubgraphSettings,
    #[serde(default)]
    pub chains: HashMap<ChainId, ChainMetadata>,
    #[serde(default)]
    pub daos: Vec<DaoDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSettings {
    pub revenue_interval_secs: u64,
    pub onchain_interval_secs: u64,
    /// Pause before each chain's on-chain reads to stay under RPC rate limits.
    pub onchain_read_delay_ms: u64,
    pub rpc_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphSettings {
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "DAO Metrics".to_string(),
                log_level: "info".to_string(),
            },
            refresh: RefreshSettings::default(),
            subgraph: SubgraphSettings::default(),
            chains: HashMap::new(),
            daos: Vec::new(),
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            revenue_interval_secs: 3600, // hourly
            onchain_interval_secs: 300,  // 5 minutes
            onchain_read_delay_ms: 3000,
            rpc_timeout_secs: 30,
        }
    }
}

impl Default for SubgraphSettings {
    fn default() -> Self {
        Self {
            page_size: 1000,
            timeout_secs: 30,
        }
    }
}

impl RefreshSettings {
    pub fn revenue_interval(&self) -> Duration {
        Duration::from_secs(self.revenue_interval_secs)
    }

    pub fn onchain_interval(&self) -> Duration {
        Duration::from_secs(self.onchain_interval_secs)
    }

    pub fn onchain_read_delay(&self) -> Duration {
        Duration::from_millis(self.onchain_read_delay_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("DAO_METRICS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        s.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.subgraph.page_size == 0 {
            return Err("Subgraph page size must be greater than 0".to_string());
        }

        if self.refresh.revenue_interval_secs == 0 || self.refresh.onchain_interval_secs == 0 {
            return Err("Refresh intervals must be greater than 0".to_string());
        }

        let mut symbols = HashSet::new();
        for dao in &self.daos {
            if !symbols.insert(dao.symbol.as_str()) {
                return Err(format!("Duplicate DAO symbol: {}", dao.symbol));
            }

            for chain in &dao.deployments {
                if !self.chains.contains_key(chain) {
                    return Err(format!(
                        "DAO {} is deployed on unknown chain {}",
                        dao.symbol, chain
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LifecyclePhase, RevenueUnit};

    fn dao(symbol: &str, chains: &[&str]) -> DaoDescriptor {
        DaoDescriptor {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            phase: LifecyclePhase::Live,
            deployments: chains.iter().map(|c| ChainId::from(*c)).collect(),
            units: vec![RevenueUnit::new("xstbl")],
        }
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.subgraph.page_size, 1000);
        assert_eq!(settings.refresh.onchain_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_rejects_duplicate_symbols() {
        let mut settings = Settings::default();
        settings.chains.insert(ChainId::from("146"), ChainMetadata::default());
        settings.daos = vec![dao("STBL", &["146"]), dao("STBL", &["146"])];

        let err = settings.validate().unwrap_err();
        assert!(err.contains("Duplicate"));
    }

    #[test]
    fn test_rejects_unknown_deployment_chain() {
        let mut settings = Settings::default();
        settings.daos = vec![dao("STBL", &["9999"])];

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let mut settings = Settings::default();
        settings.subgraph.page_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_shipped_default_config_is_consistent() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let settings = Settings::from_file(&path).unwrap();

        assert!(settings.validate().is_ok());
        assert!(settings.daos.iter().any(|dao| dao.symbol == "STBL"));

        // a live DAO needs a subgraph and both contracts on every deployment
        for dao in settings.daos.iter().filter(|dao| dao.is_live()) {
            for chain in &dao.deployments {
                let meta = &settings.chains[chain];
                assert!(meta.subgraph.is_some(), "{} on {}", dao.symbol, chain);
                assert!(meta.contracts.x_stbl.is_some(), "{} on {}", dao.symbol, chain);
                assert!(meta.contracts.revenue_router.is_some(), "{} on {}", dao.symbol, chain);
            }
        }
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("dao_metrics_settings_test.toml");
        std::fs::write(
            &path,
            r#"
[refresh]
onchain_interval_secs = 60

[chains.146]
name = "Sonic"
rpc_url = "https://rpc.soniclabs.com"

[chains.146.contracts]
x_stbl = "0x0000000000000000000000000000000000000001"

[[daos]]
symbol = "STBL"
name = "Stability"
phase = "LIVE_VESTING"
deployments = ["146"]
units = [{ unit_id = "xstbl" }]
"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.refresh.onchain_interval_secs, 60);
        assert_eq!(settings.refresh.revenue_interval_secs, 3600);
        assert_eq!(settings.daos.len(), 1);
        assert_eq!(settings.daos[0].phase, LifecyclePhase::LiveVesting);

        let sonic = &settings.chains[&ChainId::from("146")];
        assert_eq!(sonic.name, "Sonic");
        assert!(sonic.contracts.x_stbl.is_some());
        assert!(settings.validate().is_ok());
    }
}
