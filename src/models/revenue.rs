use bigdecimal::BigDecimal;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::utils::to_plain_string;

/// Period-end timestamp -> revenue distributed in that period.
///
/// Amounts are exact decimals and serialize as plain decimal strings, so
/// summing charts from several chains never goes through floating point.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RevenueChart(BTreeMap<i64, BigDecimal>);

impl RevenueChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the bucket at `period_end`.
    pub fn add(&mut self, period_end: i64, amount: BigDecimal) {
        self.0
            .entry(period_end)
            .and_modify(|current| *current += &amount)
            .or_insert(amount);
    }

    pub fn merge(&mut self, other: &RevenueChart) {
        for (period_end, amount) in &other.0 {
            self.add(*period_end, amount.clone());
        }
    }

    /// Sum charts key by key; a key missing from one chart contributes zero.
    pub fn combine<I>(charts: I) -> Self
    where
        I: IntoIterator<Item = RevenueChart>,
    {
        charts.into_iter().fold(RevenueChart::new(), |mut acc, chart| {
            acc.merge(&chart);
            acc
        })
    }

    pub fn get(&self, period_end: i64) -> Option<&BigDecimal> {
        self.0.get(&period_end)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&i64, &BigDecimal)> {
        self.0.iter()
    }

    pub fn total(&self) -> BigDecimal {
        self.0.values().fold(BigDecimal::from(0), |acc, v| acc + v)
    }
}

impl Serialize for RevenueChart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (period_end, amount) in &self.0 {
            map.serialize_entry(period_end, &to_plain_string(amount))?;
        }
        map.end()
    }
}

impl FromIterator<(i64, BigDecimal)> for RevenueChart {
    fn from_iter<T: IntoIterator<Item = (i64, BigDecimal)>>(iter: T) -> Self {
        let mut chart = RevenueChart::new();
        for (period_end, amount) in iter {
            chart.add(period_end, amount);
        }
        chart
    }
}
