//! Overall (blended) return rate
//!
//! Combines ordinary assets, time deposits and precious metals for the same
//! calendar month and applies the denominator rule once on the combined totals.
//! Rates are never averaged across asset classes.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::models::{Month, MonthKeyed, RecordSet};
use crate::reports::precious_metal::MetalBook;
use crate::reports::profit::calculate_monthly_profit;
use crate::reports::return_rate::{rate_percent, select_denominator};
use crate::reports::snapshots::{
    group_snapshots_by_account, investment_by_month, total_latest_snapshots,
};
use crate::reports::time_deposit::{collect_deposits, total_marginal_interest};

/// One month of the blended series, with the per-class breakdown it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMonth {
    pub month: Month,
    pub ordinary_profit: Decimal,
    pub deposit_profit: Decimal,
    pub metal_profit: Decimal,
    pub profit: Decimal,
    pub ordinary_investment: Decimal,
    pub metal_investment: Decimal,
    pub investment: Decimal,
    pub previous_value: Decimal,
    pub return_rate: Decimal, // percent
}

impl MonthKeyed for OverallMonth {
    fn month(&self) -> Month {
        self.month
    }
}

/// Blended monthly return series over the full history of `records`.
///
/// The month axis is every month that has an aggregate ordinary profit entry,
/// an ordinary record, a metal lot, or deposit interest.
pub fn calculate_overall_returns(records: &RecordSet) -> Vec<OverallMonth> {
    let ordinary = records.ordinary_records();
    let deposits = collect_deposits(&records.time_deposits());
    let metals = MetalBook::new(&records.metals);

    let ordinary_profit: BTreeMap<Month, Decimal> = calculate_monthly_profit(&ordinary)
        .into_iter()
        .map(|e| (e.month, e.profit))
        .collect();
    let ordinary_investment = investment_by_month(&ordinary);
    let snapshots = group_snapshots_by_account(&ordinary);

    let mut months: BTreeSet<Month> = BTreeSet::new();
    months.extend(ordinary_profit.keys().copied());
    months.extend(ordinary_investment.keys().copied());
    months.extend(metals.months());
    months.extend(deposits.iter().flat_map(|d| d.interest_months()));

    debug!(
        months = months.len(),
        deposits = deposits.len(),
        "Computing blended return series"
    );

    months
        .into_iter()
        .map(|month| {
            let ordinary_profit = ordinary_profit.get(&month).copied().unwrap_or_default();
            let deposit_profit = total_marginal_interest(&deposits, month);
            let metal_profit = metals.monthly_profit(month);
            let profit = ordinary_profit + deposit_profit + metal_profit;

            let ordinary_investment = ordinary_investment.get(&month).copied().unwrap_or_default();
            let metal_investment = metals.purchase_cost_in(month);
            let investment = ordinary_investment + metal_investment;

            let previous = month.prev();
            let previous_value =
                total_latest_snapshots(&snapshots, previous) + metals.market_value(previous);

            OverallMonth {
                month,
                ordinary_profit,
                deposit_profit,
                metal_profit,
                profit,
                ordinary_investment,
                metal_investment,
                investment,
                previous_value,
                return_rate: rate_percent(profit, select_denominator(investment, previous_value)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AssetType, InvestmentRecord, PreciousMetalRecord, RecordsByAssetType, RecordsByMetalType,
    };
    use rust_decimal_macros::dec;

    fn m(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn stock(date: &str, amount: Decimal, snap: Decimal) -> InvestmentRecord {
        InvestmentRecord::new(
            format!("s-{date}"),
            m(date),
            "broker",
            AssetType::Stocks,
            amount,
            Some(snap),
        )
    }

    fn gold(date: &str, grams: Decimal, price: Decimal) -> PreciousMetalRecord {
        PreciousMetalRecord {
            id: format!("g-{date}"),
            date: m(date),
            metal_type: "gold".to_string(),
            account: "vault".to_string(),
            grams,
            price_per_gram: price,
            average_price: Some(price),
        }
    }

    fn blended_set() -> RecordSet {
        let mut records = RecordsByAssetType::new();
        records.insert(
            AssetType::Stocks,
            vec![
                stock("2024-01", dec!(1000), dec!(1000)),
                stock("2024-02", dec!(0), dec!(1000)),
                stock("2024-03", dec!(0), dec!(1100)),
            ],
        );
        records.insert(
            AssetType::TimeDeposit,
            vec![InvestmentRecord::time_deposit(
                "td",
                m("2024-01"),
                "bank",
                dec!(12000),
                6,
                dec!(3),
            )],
        );
        let mut metals = RecordsByMetalType::new();
        metals.insert(
            "gold".to_string(),
            vec![gold("2024-01", dec!(10), dec!(500)), gold("2024-02", dec!(10), dec!(510))],
        );
        RecordSet::new(records, metals)
    }

    #[test]
    fn test_combines_classes_before_applying_rate() {
        let series = calculate_overall_returns(&blended_set());
        let feb = series.iter().find(|e| e.month == m("2024-02")).unwrap();

        // ordinary: (1100 - 1000) - 0; deposit: 30; metal: 100
        assert_eq!(feb.ordinary_profit, dec!(100));
        assert_eq!(feb.deposit_profit, dec!(30));
        assert_eq!(feb.metal_profit, dec!(100));
        assert_eq!(feb.profit, dec!(230));
        // deposit principal is not monthly investment
        assert_eq!(feb.investment, dec!(5100));
        assert_eq!(feb.previous_value, dec!(6000));
        assert_eq!(feb.return_rate, rate_percent(dec!(230), dec!(5100)));
    }

    #[test]
    fn test_month_axis_includes_deposit_interest_months() {
        let series = calculate_overall_returns(&blended_set());
        let months: Vec<Month> = series.iter().map(|e| e.month).collect();
        assert_eq!(months.first(), Some(&m("2024-01")));
        assert_eq!(months.last(), Some(&m("2024-07")));
        let jul = series.last().unwrap();
        assert_eq!(jul.deposit_profit, dec!(30));
        assert_eq!(jul.investment, dec!(0));
        // baseline falls back to the latest snapshot (1100); gold is unpriced in June
        assert_eq!(jul.previous_value, dec!(1100));
        assert_eq!(jul.return_rate, rate_percent(dec!(30), dec!(1100)));
    }

    #[test]
    fn test_zero_investment_month_uses_baseline() {
        let series = calculate_overall_returns(&blended_set());
        let mar = series.iter().find(|e| e.month == m("2024-03")).unwrap();
        // March: no ordinary entry (last snapshot), deposit 30, gold unpriced
        assert_eq!(mar.profit, dec!(30));
        assert_eq!(mar.previous_value, dec!(1000) + dec!(10200));
        assert_eq!(mar.return_rate, rate_percent(dec!(30), dec!(11200)));
    }

    #[test]
    fn test_empty_record_set() {
        assert!(calculate_overall_returns(&RecordSet::default()).is_empty());
    }
}
