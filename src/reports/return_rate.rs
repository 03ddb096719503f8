//! Monthly return rate
//!
//! Return rate normalizes profit by a base that depends on the month:
//! the contribution made that month when there is one, otherwise the previous
//! month's valuation. This keeps months without new money from producing an
//! undefined or inflated rate. The same rule is reused by the blended
//! calculator in [`crate::reports::overall`].

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{month_diff, InvestmentRecord, Month, MonthlyReturnData};
use crate::reports::profit::SeriesByAccount;
use crate::reports::snapshots::{group_snapshots_by_account, investment_by_account_month};

/// Contribution when positive, otherwise the previous valuation
pub fn select_denominator(investment: Decimal, previous_value: Decimal) -> Decimal {
    if investment > Decimal::ZERO {
        investment
    } else {
        previous_value
    }
}

/// `profit / denominator * 100`, zero when the denominator is not positive or
/// the result does not fit in a `Decimal`
pub fn rate_percent(profit: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    profit
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Build one entry, applying the denominator rule
pub fn return_entry(
    month: Month,
    profit: Decimal,
    investment: Decimal,
    previous_value: Decimal,
) -> MonthlyReturnData {
    MonthlyReturnData {
        month,
        return_rate: rate_percent(profit, select_denominator(investment, previous_value)),
        previous_snapshot_value: previous_value,
        profit,
        investment,
    }
}

/// Per-account monthly return rate.
///
/// The first snapshot has a previous value of zero, so its profit is the snapshot
/// minus the month's contribution and its base is the contribution alone. Later
/// snapshots are compared with the snapshot exactly one month earlier; a snapshot
/// following a gap gets no entry.
pub fn calculate_monthly_returns_by_account(
    records: &[InvestmentRecord],
) -> SeriesByAccount<MonthlyReturnData> {
    let snapshots = group_snapshots_by_account(records);
    let investments = investment_by_account_month(records);

    let mut result = SeriesByAccount::new();
    for (account, chain) in &snapshots {
        let invested_in = |month: Month| {
            investments
                .get(&(account.clone(), month))
                .copied()
                .unwrap_or(Decimal::ZERO)
        };

        let mut series = Vec::with_capacity(chain.len());
        if let Some(first) = chain.first() {
            let investment = invested_in(first.date);
            series.push(return_entry(
                first.date,
                first.value - investment,
                investment,
                Decimal::ZERO,
            ));
        }

        for pair in chain.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if month_diff(previous.date, current.date) != 1 {
                continue;
            }
            let investment = invested_in(current.date);
            let profit = (current.value - previous.value) - investment;
            series.push(return_entry(current.date, profit, investment, previous.value));
        }

        result.insert(account.clone(), series);
    }
    result
}

/// Sum profit, investment and previous value across accounts per month, then
/// apply the denominator rule to the totals
pub fn aggregate_monthly_returns(
    by_account: &SeriesByAccount<MonthlyReturnData>,
) -> Vec<MonthlyReturnData> {
    let mut totals: BTreeMap<Month, (Decimal, Decimal, Decimal)> = BTreeMap::new();
    for entry in by_account.values().flatten() {
        let slot = totals
            .entry(entry.month)
            .or_insert((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        slot.0 += entry.profit;
        slot.1 += entry.investment;
        slot.2 += entry.previous_snapshot_value;
    }

    totals
        .into_iter()
        .map(|(month, (profit, investment, previous))| {
            return_entry(month, profit, investment, previous)
        })
        .collect()
}

/// Aggregate monthly return rate across all accounts
pub fn calculate_monthly_returns(records: &[InvestmentRecord]) -> Vec<MonthlyReturnData> {
    aggregate_monthly_returns(&calculate_monthly_returns_by_account(records))
}
