//! End-to-end calculation scenarios over the public library API

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt::Debug;

use holdings::importers::{load_dataset, parse_dataset};
use holdings::models::{
    AssetType, InvestmentRecord, Month, MonthKeyed, PreciousMetalRecord, RecordSet,
    RecordsByMetalType,
};
use holdings::reports::{
    apply_window, calculate_monthly_profit, calculate_monthly_returns, calculate_overall_returns,
    DisplayWindow, MetalBook, Series, SeriesCache, SeriesKind, TimeDeposit,
};

fn m(s: &str) -> Month {
    s.parse().unwrap()
}

fn stock(date: &str, account: &str, amount: Decimal, snapshot: Decimal) -> InvestmentRecord {
    InvestmentRecord::new(
        format!("{account}-{date}"),
        m(date),
        account,
        AssetType::Stocks,
        amount,
        Some(snapshot),
    )
}

fn fixture(name: &str) -> RecordSet {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    load_dataset(path).unwrap().records
}

#[test]
fn simple_three_month_profit_from_fixture() {
    let records = fixture("simple3month.json");
    let series = calculate_monthly_profit(&records.ordinary_records());

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].month, m("2024-01"));
    assert_eq!(series[0].profit, dec!(0));
    assert_eq!(series[1].profit, dec!(-9000));
    assert_eq!(series[1].investment, dec!(10000));
    assert_eq!(series[1].roi, dec!(-0.9));
}

#[test]
fn gap_months_are_skipped_in_both_series() {
    let records = vec![
        stock("2024-01", "A", dec!(100), dec!(100)),
        stock("2024-04", "A", dec!(0), dec!(180)),
        stock("2024-05", "A", dec!(0), dec!(200)),
    ];

    let profit = calculate_monthly_profit(&records);
    assert_eq!(profit.len(), 1);
    assert_eq!(profit[0].month, m("2024-04"));
    assert_eq!(profit[0].profit, dec!(20));

    let returns = calculate_monthly_returns(&records);
    let months: Vec<Month> = returns.iter().map(|e| e.month).collect();
    assert_eq!(months, vec![m("2024-01"), m("2024-05")]);
}

#[test]
fn return_rate_falls_back_to_previous_value() {
    let records = vec![
        stock("2024-01", "A", dec!(1000), dec!(1000)),
        stock("2024-02", "A", dec!(0), dec!(1050)),
    ];
    let returns = calculate_monthly_returns(&records);

    assert_eq!(returns[0].return_rate, dec!(0));
    assert_eq!(returns[1].profit, dec!(50));
    assert_eq!(returns[1].previous_snapshot_value, dec!(1000));
    assert_eq!(returns[1].return_rate, dec!(5));
}

/// Every windowed entry equals the full-history entry for the same month
fn assert_same_as_full<T: MonthKeyed + PartialEq + Debug>(windowed: &[T], full: &[T]) {
    assert!(!windowed.is_empty());
    for entry in windowed {
        let original = full.iter().find(|f| f.month() == entry.month());
        assert_eq!(original, Some(entry), "entry for {} changed", entry.month());
    }
}

#[test]
fn windowed_entries_match_full_history_entries() {
    let records = fixture("blended.json");
    let window = DisplayWindow::new(Some(m("2024-02")), None);
    let mut cache = SeriesCache::new();

    let full_profit = calculate_monthly_profit(&records.ordinary_records());
    match Series::compute(&records, SeriesKind::Profit).windowed(&window) {
        Series::Profit(windowed) => {
            assert_eq!(windowed.len(), full_profit.len() - 1);
            assert_eq!(windowed[0].month, m("2024-02"));
            assert_eq!(windowed[1].profit, dec!(100));
            assert_same_as_full(&windowed, &full_profit);
        }
        other => panic!("unexpected series {:?}", other.kind()),
    }

    let full_returns = calculate_monthly_returns(&records.ordinary_records());
    match cache.get_or_compute(&records, SeriesKind::Returns, window).unwrap() {
        Series::Returns(windowed) => {
            assert_eq!(windowed[0].month, m("2024-02"));
            assert_eq!(windowed[0].previous_snapshot_value, dec!(1000));
            assert_eq!(windowed[1].return_rate, dec!(10));
            assert_same_as_full(&windowed, &full_returns);
        }
        other => panic!("unexpected series {:?}", other.kind()),
    }

    let full_overall = calculate_overall_returns(&records);
    assert!(full_overall[0].month < m("2024-02"));
    match cache.get_or_compute(&records, SeriesKind::Overall, window).unwrap() {
        Series::Overall(windowed) => {
            assert_eq!(windowed[0].month, m("2024-02"));
            assert_eq!(windowed[0].profit, dec!(230));
            assert_same_as_full(&windowed, &full_overall);
        }
        other => panic!("unexpected series {:?}", other.kind()),
    }
}

#[test]
fn truncating_records_before_computing_diverges() {
    // Guards against windowing the input instead of the output: the first
    // snapshot of a truncated chain is treated as a fresh baseline.
    let records = vec![
        stock("2024-01", "A", dec!(1000), dec!(1000)),
        stock("2024-02", "A", dec!(0), dec!(1100)),
        stock("2024-03", "A", dec!(0), dec!(1210)),
    ];
    let window = DisplayWindow::new(Some(m("2024-02")), None);

    let windowed = apply_window(&calculate_monthly_returns(&records), &window);
    let truncated: Vec<_> = records
        .iter()
        .filter(|r| window.contains(r.date))
        .cloned()
        .collect();
    let from_truncated = calculate_monthly_returns(&truncated);

    assert_eq!(windowed[0].profit, dec!(100));
    assert_eq!(windowed[0].return_rate, dec!(10));
    assert_eq!(from_truncated[0].profit, dec!(1100));
    assert_ne!(windowed, from_truncated);
}

#[test]
fn metal_profit_over_two_purchases() {
    let lot = |id: &str, date: &str, price: Decimal| PreciousMetalRecord {
        id: id.to_string(),
        date: m(date),
        metal_type: "gold".to_string(),
        account: "vault".to_string(),
        grams: dec!(10),
        price_per_gram: price,
        average_price: Some(price),
    };
    let mut metals = RecordsByMetalType::new();
    metals.insert(
        "gold".to_string(),
        vec![lot("g1", "2024-01", dec!(500)), lot("g2", "2024-02", dec!(510))],
    );
    let book = MetalBook::new(&metals);

    // 20g at 510 less both purchases
    assert_eq!(book.monthly_profit(m("2024-02")), dec!(100));
    assert_eq!(book.monthly_profit(m("2024-03")), dec!(0));
    assert_eq!(book.market_value(m("2024-03")), dec!(0));
    assert_eq!(book.market_value_forward_filled(m("2024-03")), dec!(10200));
}

#[test]
fn deposit_interest_caps_at_term() {
    let record = InvestmentRecord::time_deposit("td", m("2024-01"), "bank", dec!(12000), 6, dec!(3));
    let deposit = TimeDeposit::from_record(&record).unwrap();

    assert_eq!(deposit.monthly_interest(), dec!(30));
    assert_eq!(deposit.accrued_interest(m("2024-01")), dec!(0));
    assert_eq!(deposit.accrued_interest(m("2024-04")), dec!(90));
    assert_eq!(deposit.accrued_interest(m("2024-07")), dec!(180));
    assert_eq!(deposit.accrued_interest(m("2030-01")), dec!(180));
    assert_eq!(deposit.marginal_interest(m("2024-08")), dec!(0));
}

#[test]
fn overall_blends_fixture_classes() {
    let records = fixture("blended.json");
    let series = calculate_overall_returns(&records);
    let feb = series.iter().find(|e| e.month == m("2024-02")).unwrap();

    assert_eq!(feb.profit, dec!(230));
    assert_eq!(feb.investment, dec!(5100));
    assert_eq!(feb.previous_value, dec!(6000));
}

#[test]
fn asset_type_restriction_keeps_full_history() {
    let json = r#"{"records": {
        "stocks": [
            {"id": "s1", "date": "2024-01", "amount": 100, "snapshot": 100, "account": "A", "assetType": "stocks"},
            {"id": "s2", "date": "2024-02", "amount": 0, "snapshot": 150, "account": "A", "assetType": "stocks"},
            {"id": "s3", "date": "2024-03", "amount": 0, "snapshot": 160, "account": "A", "assetType": "stocks"}
        ],
        "funds": [
            {"id": "f1", "date": "2024-01", "amount": 50, "snapshot": 50, "account": "B", "assetType": "funds"},
            {"id": "f2", "date": "2024-02", "amount": 0, "snapshot": 40, "account": "B", "assetType": "funds"}
        ]
    }}"#;
    let records = parse_dataset(json).unwrap().records;

    let stocks_only = records.restricted_to(&[AssetType::Stocks]);
    let series = calculate_monthly_profit(&stocks_only.ordinary_records());
    assert_eq!(series.len(), 2);
    assert_eq!(series[1].profit, dec!(10));

    let all = calculate_monthly_profit(&records.ordinary_records());
    assert_eq!(all[0].profit, dec!(0));
}

#[test]
fn cache_returns_same_series_until_records_change() {
    let mut records = fixture("simple3month.json");
    let mut cache = SeriesCache::new();
    let window = DisplayWindow::all();

    let first = cache.get_or_compute(&records, SeriesKind::Profit, window).unwrap();
    let second = cache.get_or_compute(&records, SeriesKind::Profit, window).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 1);

    if let Some(list) = records.records.get_mut(&AssetType::Stocks) {
        list[2].snapshot = Some(dec!(13000));
    }
    let third = cache.get_or_compute(&records, SeriesKind::Profit, window).unwrap();
    assert_eq!(cache.misses(), 2);
    match third {
        Series::Profit(s) => assert_eq!(s[1].profit, dec!(-8000)),
        other => panic!("unexpected series {:?}", other.kind()),
    }
}
