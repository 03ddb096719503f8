//! Monthly profit and ROI
//!
//! Walks each account's snapshot chain pairwise. A pair `(s[i], s[i+1])` that is
//! exactly one calendar month apart attributes
//! `(s[i+1] - s[i]) - investment(s[i].date)` to `s[i].date`. The account's very
//! first snapshot is the baseline and is always attributed zero profit.
//!
//! A pair spanning a gap yields no entry. The chain resumes after the gap with
//! normal attribution; it is not re-baselined.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{month_diff, InvestmentRecord, Month, MonthlyInvestmentData};
use crate::reports::snapshots::{group_snapshots_by_account, investment_by_account_month};

/// Monthly series per account
pub type SeriesByAccount<T> = BTreeMap<String, Vec<T>>;

/// `profit / investment`, or zero when nothing was invested or the ratio overflows
pub fn roi(profit: Decimal, investment: Decimal) -> Decimal {
    if investment > Decimal::ZERO {
        profit.checked_div(investment).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Per-account monthly profit, investment and ROI
pub fn calculate_monthly_profit_by_account(
    records: &[InvestmentRecord],
) -> SeriesByAccount<MonthlyInvestmentData> {
    let snapshots = group_snapshots_by_account(records);
    let investments = investment_by_account_month(records);

    let mut result = SeriesByAccount::new();
    for (account, chain) in &snapshots {
        let mut series = Vec::new();
        for (i, pair) in chain.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            if month_diff(current.date, next.date) != 1 {
                continue;
            }

            let investment = investments
                .get(&(account.clone(), current.date))
                .copied()
                .unwrap_or(Decimal::ZERO);
            let profit = if i == 0 {
                Decimal::ZERO
            } else {
                (next.value - current.value) - investment
            };

            series.push(MonthlyInvestmentData {
                month: current.date,
                profit,
                investment,
                roi: roi(profit, investment),
            });
        }
        if !series.is_empty() {
            result.insert(account.clone(), series);
        }
    }
    result
}

/// Sum per-account entries month by month, recomputing ROI from the totals
pub fn aggregate_monthly_profit(
    by_account: &SeriesByAccount<MonthlyInvestmentData>,
) -> Vec<MonthlyInvestmentData> {
    let mut totals: BTreeMap<Month, (Decimal, Decimal)> = BTreeMap::new();
    for entry in by_account.values().flatten() {
        let slot = totals
            .entry(entry.month)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        slot.0 += entry.profit;
        slot.1 += entry.investment;
    }

    totals
        .into_iter()
        .map(|(month, (profit, investment))| MonthlyInvestmentData {
            month,
            profit,
            investment,
            roi: roi(profit, investment),
        })
        .collect()
}

/// Aggregate monthly profit, investment and ROI across all accounts
pub fn calculate_monthly_profit(records: &[InvestmentRecord]) -> Vec<MonthlyInvestmentData> {
    aggregate_monthly_profit(&calculate_monthly_profit_by_account(records))
}

/// Totals over a computed series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitSummary {
    pub months: usize,
    pub total_profit: Decimal,
    pub total_investment: Decimal,
    pub roi: Decimal,
}

pub fn summarize_profit(series: &[MonthlyInvestmentData]) -> ProfitSummary {
    let total_profit: Decimal = series.iter().map(|e| e.profit).sum();
    let total_investment: Decimal = series.iter().map(|e| e.investment).sum();
    ProfitSummary {
        months: series.len(),
        total_profit,
        total_investment,
        roi: roi(total_profit, total_investment),
    }
}
