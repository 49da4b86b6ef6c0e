use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use ethers::types::U256;
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    chains::{ChainClient, ContractCall},
    config::Contract,
    dao::{AdapterContext, DaoAdapter},
    models::{
        ChainId, DaoDescriptor, EngineError, OnChainData, OnChainSnapshot, RawUnitsRevenue,
        Result, RevenueChart, UnitKind, UnitSnapshot,
    },
    utils::{
        format_units, normalize_to_period_end, parse_units,
        period::{SECONDS_IN_YEAR, time_passed_in_period},
        TOKEN_DECIMALS,
    },
};

/// Reward distribution to xSTBL stakers, as indexed by the subgraph.
#[derive(Debug, Clone, Deserialize)]
struct XStakingNotifyReward {
    timestamp: IntField,
    amount: IntField,
}

/// Subgraph `BigInt` fields arrive as strings, plain ints as numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IntField {
    Text(String),
    Number(u64),
}

impl IntField {
    fn as_text(&self) -> String {
        match self {
            IntField::Text(s) => s.clone(),
            IntField::Number(n) => n.to_string(),
        }
    }
}

fn reward_history_query(first: usize, skip: usize) -> String {
    format!(
        r#"{{
  xstakingNotifyRewardHistoryEntities(
    first: {}
    skip: {}
    orderBy: timestamp
    orderDirection: desc
  ) {{
    timestamp
    amount
  }}
}}"#,
        first, skip
    )
}

/// `pending / staked`, annualized from the time elapsed in the current period,
/// as a percentage. Undefined rather than infinite when nothing is staked.
pub fn compute_apr(pending: &BigDecimal, staked: &BigDecimal, time_passed: i64) -> Option<f64> {
    if staked.is_zero() || time_passed <= 0 {
        return None;
    }

    let ratio = (pending / staked).to_f64()?;
    let apr = ratio * (SECONDS_IN_YEAR as f64 / time_passed as f64) * 100.0;

    apr.is_finite().then_some(apr)
}

/// Keep the chains that succeeded. Transient failures drop only that chain,
/// unless every chain failed; configuration errors always propagate.
fn collect_chain_results<T>(
    dao: &DaoDescriptor,
    what: &str,
    results: Vec<(ChainId, Result<T>)>,
) -> Result<Vec<(ChainId, T)>> {
    let attempted = results.len();
    let mut ok = Vec::with_capacity(attempted);
    let mut last_error = None;

    for (chain, result) in results {
        match result {
            Ok(value) => ok.push((chain, value)),
            Err(e) if e.is_transient() => {
                warn!("Omitting chain {} from {} {}: {}", chain, dao.symbol, what, e);
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    match last_error {
        Some(e) if ok.is_empty() && attempted > 0 => Err(e),
        _ => Ok(ok),
    }
}

/// Adapter for the Stability DAO and its xSTBL staking.
pub struct StblAdapter {
    dao: DaoDescriptor,
    ctx: AdapterContext,
    is_live: bool,
}

impl StblAdapter {
    pub const SYMBOL: &'static str = "STBL";

    pub fn new(dao: DaoDescriptor, ctx: AdapterContext) -> Result<Self> {
        if dao.symbol != Self::SYMBOL {
            return Err(EngineError::Config(format!(
                "Failed to initialize STBL DAO adapter. Expected {}, got {}",
                Self::SYMBOL,
                dao.symbol
            )));
        }

        let is_live = dao.is_live();
        Ok(Self { dao, ctx, is_live })
    }

    pub fn construct(dao: DaoDescriptor, ctx: AdapterContext) -> Result<Arc<dyn DaoAdapter>> {
        Ok(Arc::new(Self::new(dao, ctx)?))
    }

    fn chains(&self) -> &[ChainId] {
        &self.dao.deployments
    }

    async fn revenue_chart_for_chain(&self, chain: &ChainId) -> Result<RevenueChart> {
        let entries: Vec<XStakingNotifyReward> = self
            .ctx
            .subgraph
            .query_paginated(chain, reward_history_query)
            .await?;

        let mut chart = RevenueChart::new();
        for entry in &entries {
            let (period_end, amount) = Self::normalize_to_end_period(entry)?;
            chart.add(period_end, amount);
        }

        debug!(
            "{} reward events on {} -> {} periods",
            entries.len(),
            chain,
            chart.len()
        );
        Ok(chart)
    }

    fn normalize_to_end_period(entry: &XStakingNotifyReward) -> Result<(i64, BigDecimal)> {
        let raw_ts = entry.timestamp.as_text();
        let timestamp: i64 = raw_ts
            .trim()
            .parse()
            .map_err(|_| EngineError::InvalidAmount(format!("timestamp {}", raw_ts)))?;

        let period_end = normalize_to_period_end(timestamp)
            .ok_or_else(|| EngineError::InvalidAmount(format!("timestamp {}", timestamp)))?;
        let amount = parse_units(&entry.amount.as_text(), TOKEN_DECIMALS)?;

        Ok((period_end, amount))
    }

    async fn onchain_data_for_chain(&self, chain: &ChainId) -> Result<OnChainSnapshot> {
        if !self.ctx.onchain_read_delay.is_zero() {
            tokio::time::sleep(self.ctx.onchain_read_delay).await;
        }

        let client = self
            .ctx
            .rpc
            .get_client(chain)
            .ok_or_else(|| EngineError::RpcClientNotFound(chain.to_string()))?;

        let now = self.ctx.now();
        let time_passed = time_passed_in_period(now);

        let x_stbl = self.ctx.chains.contract_address(chain, Contract::XStbl)?;
        let total_staked = client.read_uint(x_stbl, ContractCall::TotalSupply).await?;

        let units = self.units_revenue(client.as_ref(), chain).await?;

        let staked = format_units(total_staked, TOKEN_DECIMALS);
        let pending_revenue = format_units(units.total(), TOKEN_DECIMALS);
        let staking_apr = compute_apr(&pending_revenue, &staked, time_passed);

        if staking_apr.is_none() {
            debug!("APR undefined on {} (staked {})", chain, staked);
        }

        let units = units
            .units
            .into_iter()
            .map(|(unit_id, raw)| {
                let snapshot = UnitSnapshot {
                    pending_revenue: format_units(raw, TOKEN_DECIMALS),
                };
                (unit_id, snapshot)
            })
            .collect();

        Ok(OnChainSnapshot {
            staked,
            staking_apr,
            units,
        })
    }

    async fn units_revenue(
        &self,
        client: &dyn ChainClient,
        chain: &ChainId,
    ) -> Result<RawUnitsRevenue> {
        let mut result = RawUnitsRevenue::default();

        for unit in &self.dao.units {
            let pending = match unit.kind() {
                UnitKind::StakingVault => {
                    let router = self.ctx.chains.contract_address(chain, Contract::RevenueRouter)?;
                    client
                        .read_uint(router, ContractCall::PendingRevenue { unit_index: None })
                        .await?
                }
                UnitKind::Rebase => {
                    let x_stbl = self.ctx.chains.contract_address(chain, Contract::XStbl)?;
                    client.read_uint(x_stbl, ContractCall::PendingRebase).await?
                }
                UnitKind::LendingMarket => {
                    let router = self.ctx.chains.contract_address(chain, Contract::RevenueRouter)?;
                    client
                        .read_uint(router, ContractCall::PendingRevenue { unit_index: Some(0) })
                        .await?
                }
                UnitKind::Unknown => U256::zero(),
            };

            result.insert(unit.unit_id.clone(), pending);
        }

        Ok(result)
    }
}

#[async_trait]
impl DaoAdapter for StblAdapter {
    fn dao(&self) -> &DaoDescriptor {
        &self.dao
    }

    async fn revenue_chart(&self) -> Result<RevenueChart> {
        if !self.is_live {
            return Ok(RevenueChart::new());
        }

        let chains = self.chains();
        let charts = join_all(chains.iter().map(|chain| async move {
            (chain.clone(), self.revenue_chart_for_chain(chain).await)
        }))
        .await;

        let charts = collect_chain_results(&self.dao, "revenue chart", charts)?;
        let chart = RevenueChart::combine(charts.into_iter().map(|(_, chart)| chart));

        info!(
            "Built {} revenue chart: {} periods from {} chains",
            self.dao.symbol,
            chart.len(),
            chains.len()
        );
        Ok(chart)
    }

    async fn onchain_data(&self) -> Result<OnChainData> {
        if !self.is_live {
            return Ok(OnChainData::new());
        }

        let snapshots = join_all(self.chains().iter().map(|chain| async move {
            (chain.clone(), self.onchain_data_for_chain(chain).await)
        }))
        .await;

        let snapshots = collect_chain_results(&self.dao, "on-chain data", snapshots)?;
        Ok(snapshots.into_iter().collect())
    }
}
