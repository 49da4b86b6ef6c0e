use bigdecimal::BigDecimal;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::{models::ChainId, utils::serialize_amount};

/// Live staking metrics for one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnChainSnapshot {
    #[serde(serialize_with = "serialize_amount")]
    pub staked: BigDecimal,
    /// `None` when the APR is undefined, e.g. nothing is staked yet.
    pub staking_apr: Option<f64>,
    pub units: BTreeMap<String, UnitSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    #[serde(serialize_with = "serialize_amount")]
    pub pending_revenue: BigDecimal,
}

pub type OnChainData = BTreeMap<ChainId, OnChainSnapshot>;

/// Pending revenue per unit in the token's smallest unit.
#[derive(Debug, Clone, Default)]
pub struct RawUnitsRevenue {
    pub units: HashMap<String, U256>,
}

impl RawUnitsRevenue {
    pub fn insert(&mut self, unit_id: impl Into<String>, pending_revenue: U256) {
        self.units.insert(unit_id.into(), pending_revenue);
    }

    /// Saturates instead of wrapping; a real sum never gets near `U256::MAX`.
    pub fn total(&self) -> U256 {
        self.units
            .values()
            .fold(U256::zero(), |acc, v| acc.saturating_add(*v))
    }
}
