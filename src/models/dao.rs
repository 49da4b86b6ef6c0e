use serde::{Deserialize, Serialize};

use crate::models::ChainId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaoDescriptor {
    pub symbol: String,
    pub name: String,
    pub phase: LifecyclePhase,
    #[serde(default)]
    pub deployments: Vec<ChainId>,
    #[serde(default)]
    pub units: Vec<RevenueUnit>,
}

impl DaoDescriptor {
    pub fn is_live(&self) -> bool {
        self.phase.is_live()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecyclePhase {
    Draft,
    Seed,
    SeedFailed,
    Development,
    Tge,
    LiveCliff,
    LiveVesting,
    Live,
    Absorbed,
}

impl LifecyclePhase {
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            LifecyclePhase::LiveCliff | LifecyclePhase::LiveVesting | LifecyclePhase::Live
        )
    }
}

/// A named sub-system contributing pending revenue to stakers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueUnit {
    pub unit_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl RevenueUnit {
    pub fn new(unit_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            name: None,
        }
    }

    pub fn kind(&self) -> UnitKind {
        UnitKind::from_unit_id(&self.unit_id)
    }
}

/// Selects which contract read reports a unit's pending revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Revenue router `pendingRevenue()`
    StakingVault,
    /// xSTBL `pendingRebase()`
    Rebase,
    /// Revenue router `pendingRevenue(0)`
    LendingMarket,
    Unknown,
}

impl UnitKind {
    pub fn from_unit_id(unit_id: &str) -> Self {
        match unit_id {
            "xstbl" => UnitKind::StakingVault,
            "stability:stabilityFarm" => UnitKind::Rebase,
            "stability:stabilityMarket" => UnitKind::LendingMarket,
            _ => UnitKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_phases() {
        assert!(LifecyclePhase::Live.is_live());
        assert!(LifecyclePhase::LiveCliff.is_live());
        assert!(LifecyclePhase::LiveVesting.is_live());
        assert!(!LifecyclePhase::Draft.is_live());
        assert!(!LifecyclePhase::Tge.is_live());
        assert!(!LifecyclePhase::Absorbed.is_live());
    }

    #[test]
    fn test_phase_deserialization() {
        let phase: LifecyclePhase = serde_json::from_str("\"LIVE_VESTING\"").unwrap();
        assert_eq!(phase, LifecyclePhase::LiveVesting);
    }

    #[test]
    fn test_unit_kind_dispatch() {
        assert_eq!(RevenueUnit::new("xstbl").kind(), UnitKind::StakingVault);
        assert_eq!(RevenueUnit::new("stability:stabilityFarm").kind(), UnitKind::Rebase);
        assert_eq!(
            RevenueUnit::new("stability:stabilityMarket").kind(),
            UnitKind::LendingMarket
        );
        assert_eq!(RevenueUnit::new("stability:bridge").kind(), UnitKind::Unknown);
    }
}
