//! Asset distribution at a month
//!
//! Values every asset class as of a month for allocation views. Unlike the
//! profit series this uses display-mode valuation: ordinary accounts carry
//! their latest snapshot forward and metals carry their last known price.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{AssetType, Month, RecordSet};
use crate::reports::precious_metal::MetalBook;
use crate::reports::return_rate::rate_percent;
use crate::reports::snapshots::{group_snapshots_by_account, total_latest_snapshots};
use crate::reports::time_deposit::deposit_value_at;

/// Value held in one asset class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSlice {
    pub label: String,
    pub value: Decimal,
    pub share_pct: Decimal,
}

/// Allocation across asset classes and metal types at a month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetDistribution {
    pub month: Month,
    pub total: Decimal,
    pub slices: Vec<AllocationSlice>,
}

pub fn calculate_asset_distribution(records: &RecordSet, month: Month) -> AssetDistribution {
    let mut values: BTreeMap<String, Decimal> = BTreeMap::new();

    for (asset_type, list) in &records.records {
        let ordinary: Vec<_> = list.iter().filter(|r| !r.is_time_deposit).cloned().collect();
        let value = total_latest_snapshots(&group_snapshots_by_account(&ordinary), month);
        *values.entry(asset_type.to_string()).or_insert(Decimal::ZERO) += value;
    }

    let deposit_value: Decimal = records
        .time_deposits()
        .iter()
        .map(|r| deposit_value_at(r, month))
        .sum();
    *values
        .entry(AssetType::TimeDeposit.to_string())
        .or_insert(Decimal::ZERO) += deposit_value;

    let metals = MetalBook::new(&records.metals);
    for metal in metals.metal_types() {
        if let Some(ledger) = metals.ledger(metal) {
            values.insert(metal.to_string(), ledger.market_value_forward_filled(month));
        }
    }

    let total: Decimal = values.values().copied().sum();
    let slices = values
        .into_iter()
        .filter(|(_, value)| !value.is_zero())
        .map(|(label, value)| AllocationSlice {
            share_pct: rate_percent(value, total),
            label,
            value,
        })
        .collect();

    AssetDistribution {
        month,
        total,
        slices,
    }
}
