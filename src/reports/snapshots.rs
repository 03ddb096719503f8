//! Snapshot aggregation
//!
//! Groups per-account valuation snapshots by account, sorted chronologically.
//! Every other calculator builds on these chains.

use itertools::Itertools;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{InvestmentRecord, Month, Snapshot};

/// Snapshot chains keyed by account
pub type SnapshotsByAccount = BTreeMap<String, Vec<Snapshot>>;

/// Group snapshot-bearing records by account, ascending by month.
///
/// Records without a snapshot are excluded. An account with no snapshot at all
/// gets no entry (absence means "no data", not "zero"). The sort is stable, so
/// two snapshots recorded for the same month keep their input order.
pub fn group_snapshots_by_account(records: &[InvestmentRecord]) -> SnapshotsByAccount {
    let mut grouped = SnapshotsByAccount::new();
    for record in records {
        if let Some(value) = record.snapshot {
            grouped
                .entry(record.account.clone())
                .or_default()
                .push(Snapshot {
                    date: record.date,
                    value,
                });
        }
    }

    for chain in grouped.values_mut() {
        chain.sort_by_key(|s| s.date);
    }
    grouped
}

/// Sum of contributions per (account, month), counting every record whether or
/// not it carries a snapshot
pub fn investment_by_account_month(
    records: &[InvestmentRecord],
) -> BTreeMap<(String, Month), Decimal> {
    let mut sums = BTreeMap::new();
    for record in records {
        *sums
            .entry((record.account.clone(), record.date))
            .or_insert(Decimal::ZERO) += record.amount;
    }
    sums
}

/// Sum of contributions per month across all accounts
pub fn investment_by_month(records: &[InvestmentRecord]) -> BTreeMap<Month, Decimal> {
    records
        .iter()
        .into_group_map_by(|r| r.date)
        .into_iter()
        .map(|(month, group)| (month, group.iter().map(|r| r.amount).sum()))
        .collect()
}

/// Latest snapshot value at or before `month`, or `None` when the chain starts later.
/// Expects `chain` sorted ascending.
pub fn latest_snapshot_at_or_before(chain: &[Snapshot], month: Month) -> Option<Decimal> {
    chain
        .iter()
        .take_while(|s| s.date <= month)
        .last()
        .map(|s| s.value)
}

/// Sum over accounts of each account's latest snapshot at or before `month`
pub fn total_latest_snapshots(snapshots: &SnapshotsByAccount, month: Month) -> Decimal {
    snapshots
        .values()
        .filter_map(|chain| latest_snapshot_at_or_before(chain, month))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetType;
    use rust_decimal_macros::dec;

    fn m(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn rec(id: &str, date: &str, account: &str, amount: Decimal, snap: Option<Decimal>) -> InvestmentRecord {
        InvestmentRecord::new(id, m(date), account, AssetType::Funds, amount, snap)
    }

    #[test]
    fn test_groups_and_sorts_by_account() {
        let records = vec![
            rec("1", "2024-03", "A", dec!(0), Some(dec!(300))),
            rec("2", "2024-01", "A", dec!(0), Some(dec!(100))),
            rec("3", "2024-02", "B", dec!(0), Some(dec!(20))),
            rec("4", "2024-02", "A", dec!(0), Some(dec!(200))),
        ];
        let grouped = group_snapshots_by_account(&records);
        assert_eq!(grouped.len(), 2);
        let a: Vec<Decimal> = grouped["A"].iter().map(|s| s.value).collect();
        assert_eq!(a, vec![dec!(100), dec!(200), dec!(300)]);
    }

    #[test]
    fn test_account_without_snapshots_has_no_entry() {
        let records = vec![
            rec("1", "2024-01", "A", dec!(500), None),
            rec("2", "2024-01", "B", dec!(0), Some(dec!(10))),
        ];
        let grouped = group_snapshots_by_account(&records);
        assert!(!grouped.contains_key("A"));
        assert!(grouped.contains_key("B"));
    }

    #[test]
    fn test_investment_counts_records_without_snapshot() {
        let records = vec![
            rec("1", "2024-01", "A", dec!(500), None),
            rec("2", "2024-01", "A", dec!(250), Some(dec!(750))),
            rec("3", "2024-01", "B", dec!(100), None),
        ];
        let per_account = investment_by_account_month(&records);
        assert_eq!(per_account[&("A".to_string(), m("2024-01"))], dec!(750));
        assert_eq!(investment_by_month(&records)[&m("2024-01")], dec!(850));
    }

    #[test]
    fn test_latest_snapshot_at_or_before() {
        let chain = vec![
            Snapshot { date: m("2024-01"), value: dec!(100) },
            Snapshot { date: m("2024-04"), value: dec!(400) },
        ];
        assert_eq!(latest_snapshot_at_or_before(&chain, m("2023-12")), None);
        assert_eq!(latest_snapshot_at_or_before(&chain, m("2024-03")), Some(dec!(100)));
        assert_eq!(latest_snapshot_at_or_before(&chain, m("2024-04")), Some(dec!(400)));
    }
}
