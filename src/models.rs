use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::HoldingsError;

/// A calendar month (`YYYY-MM`). No day-of-month or timezone is modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month(NaiveDate); // always the first day of the month

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Month)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Step by `n` calendar months (negative steps go back).
    /// Saturates at the edge of the range chrono can represent.
    pub fn add_months(self, n: i32) -> Month {
        let stepped = if n >= 0 {
            self.0.checked_add_months(Months::new(n.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(n.unsigned_abs()))
        };
        stepped.map(Month).unwrap_or(self)
    }

    pub fn next(self) -> Month {
        self.add_months(1)
    }

    pub fn prev(self) -> Month {
        self.add_months(-1)
    }
}

/// Calendar months between two month tokens (`to - from`).
pub fn month_diff(from: Month, to: Month) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = HoldingsError;

    /// Accepts `YYYY-MM`; a trailing `-DD` is validated and discarded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || HoldingsError::ParseError(format!("invalid month token '{}'", text));

        let parts: Vec<&str> = text.split('-').collect();
        match parts.as_slice() {
            [year, month] => {
                if year.len() != 4 || month.len() != 2 {
                    return Err(invalid());
                }
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let month: u32 = month.parse().map_err(|_| invalid())?;
                Month::new(year, month).ok_or_else(invalid)
            }
            [_, _, _] => {
                let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| invalid())?;
                Month::new(date.year(), date.month()).ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Month {
    type Error = HoldingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

/// Asset classification tags
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AssetType {
    #[serde(alias = "stock")]
    Stocks,
    #[serde(alias = "fund")]
    Funds,
    #[serde(alias = "bond")]
    Bonds,
    #[serde(alias = "deposit")]
    TimeDeposit,
    Other,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stocks => "stocks",
            AssetType::Funds => "funds",
            AssetType::Bonds => "bonds",
            AssetType::TimeDeposit => "time-deposit",
            AssetType::Other => "other",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = HoldingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stocks" | "stock" => Ok(AssetType::Stocks),
            "funds" | "fund" => Ok(AssetType::Funds),
            "bonds" | "bond" => Ok(AssetType::Bonds),
            "time-deposit" | "deposit" => Ok(AssetType::TimeDeposit),
            "other" => Ok(AssetType::Other),
            other => Err(HoldingsError::ParseError(format!(
                "unknown asset type '{}'",
                other
            ))),
        }
    }
}

/// One contribution/valuation event for an ordinary (non-metal) asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRecord {
    pub id: String,
    pub date: Month,
    #[serde(default)]
    pub amount: Decimal,
    /// Account valuation at month-end; `None` means no valuation recorded this month
    #[serde(default)]
    pub snapshot: Option<Decimal>,
    pub account: String,
    pub asset_type: AssetType,
    #[serde(default)]
    pub is_time_deposit: bool,
    #[serde(default)]
    pub deposit_term_months: Option<u32>,
    #[serde(default)]
    pub annual_interest_rate: Option<Decimal>, // percent per year, e.g. 3.5
    #[serde(default)]
    pub maturity_date: Option<Month>,
}

impl InvestmentRecord {
    /// Ordinary record with an optional month-end valuation
    pub fn new(
        id: impl Into<String>,
        date: Month,
        account: impl Into<String>,
        asset_type: AssetType,
        amount: Decimal,
        snapshot: Option<Decimal>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            amount,
            snapshot,
            account: account.into(),
            asset_type,
            is_time_deposit: false,
            deposit_term_months: None,
            annual_interest_rate: None,
            maturity_date: None,
        }
    }

    /// Fixed-term deposit record; `amount` is the principal
    pub fn time_deposit(
        id: impl Into<String>,
        date: Month,
        account: impl Into<String>,
        principal: Decimal,
        term_months: u32,
        annual_rate: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            amount: principal,
            snapshot: None,
            account: account.into(),
            asset_type: AssetType::TimeDeposit,
            is_time_deposit: true,
            deposit_term_months: Some(term_months),
            annual_interest_rate: Some(annual_rate),
            maturity_date: i32::try_from(term_months)
                .ok()
                .map(|term| date.add_months(term)),
        }
    }

    /// `date + term` when a term is present. Always derived, never read from the stored field.
    pub fn computed_maturity(&self) -> Option<Month> {
        self.deposit_term_months
            .and_then(|term| i32::try_from(term).ok())
            .map(|term| self.date.add_months(term))
    }
}

/// One purchase lot of a precious metal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreciousMetalRecord {
    pub id: String,
    pub date: Month,
    pub metal_type: String,
    pub account: String,
    pub grams: Decimal,
    pub price_per_gram: Decimal,
    /// Market price for this calendar month, used for valuation only
    #[serde(default)]
    pub average_price: Option<Decimal>,
}

impl PreciousMetalRecord {
    pub fn purchase_cost(&self) -> Decimal {
        self.grams * self.price_per_gram
    }
}

/// Mapping from asset type to its records
pub type RecordsByAssetType = BTreeMap<AssetType, Vec<InvestmentRecord>>;

/// Mapping from metal type label (gold, silver, ...) to its purchase lots
pub type RecordsByMetalType = BTreeMap<String, Vec<PreciousMetalRecord>>;

/// Read-only record collections handed to the engine for one computation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecordSet {
    #[serde(default)]
    pub records: RecordsByAssetType,
    #[serde(default)]
    pub metals: RecordsByMetalType,
}

impl RecordSet {
    pub fn new(records: RecordsByAssetType, metals: RecordsByMetalType) -> Self {
        Self { records, metals }
    }

    /// Records that participate in snapshot chains (everything except time deposits)
    pub fn ordinary_records(&self) -> Vec<InvestmentRecord> {
        self.records
            .values()
            .flatten()
            .filter(|r| !r.is_time_deposit)
            .cloned()
            .collect()
    }

    /// Records flagged as fixed-term deposits
    pub fn time_deposits(&self) -> Vec<InvestmentRecord> {
        self.records
            .values()
            .flatten()
            .filter(|r| r.is_time_deposit)
            .cloned()
            .collect()
    }

    /// Selects which asset types take part in a computation. This narrows the
    /// record selection, never the history of the selected records.
    pub fn restricted_to(&self, asset_types: &[AssetType]) -> RecordSet {
        let records = self
            .records
            .iter()
            .filter(|(asset_type, _)| asset_types.contains(asset_type))
            .map(|(asset_type, list)| (*asset_type, list.clone()))
            .collect();
        RecordSet {
            records,
            metals: self.metals.clone(),
        }
    }

    /// Latest month any record or lot is dated in
    pub fn latest_month(&self) -> Option<Month> {
        let records = self.records.values().flatten().map(|r| r.date);
        let lots = self.metals.values().flatten().map(|l| l.date);
        records.chain(lots).max()
    }

    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum::<usize>()
            + self.metals.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}

/// A recorded total valuation for an account as of a month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: Month,
    pub value: Decimal,
}

/// Period profit, contribution and ROI for one month (per account or aggregate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyInvestmentData {
    pub month: Month,
    pub profit: Decimal,
    pub investment: Decimal,
    pub roi: Decimal,
}

/// Period profit normalized by the return-rate base for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturnData {
    pub month: Month,
    pub return_rate: Decimal, // percent
    pub previous_snapshot_value: Decimal,
    pub profit: Decimal,
    pub investment: Decimal,
}

/// Anything keyed by a month, so display windows can be applied uniformly
pub trait MonthKeyed {
    fn month(&self) -> Month;
}

impl MonthKeyed for MonthlyInvestmentData {
    fn month(&self) -> Month {
        self.month
    }
}

impl MonthKeyed for MonthlyReturnData {
    fn month(&self) -> Month {
        self.month
    }
}

impl MonthKeyed for Snapshot {
    fn month(&self) -> Month {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn m(s: &str) -> Month {
        s.parse().unwrap()
    }

    #[test]
    fn test_month_parse_and_display() {
        assert_eq!(m("2024-06").to_string(), "2024-06");
        assert_eq!(m("2024-06-30").to_string(), "2024-06");
        assert!("2024-13".parse::<Month>().is_err());
        assert!("2024-6".parse::<Month>().is_err());
        assert!("june".parse::<Month>().is_err());
        assert!("2024-02-30".parse::<Month>().is_err());
    }

    #[test]
    fn test_month_arithmetic_crosses_years() {
        assert_eq!(m("2023-12").next(), m("2024-01"));
        assert_eq!(m("2024-01").prev(), m("2023-12"));
        assert_eq!(m("2024-01").add_months(14), m("2025-03"));
        assert_eq!(m("2024-01").add_months(-13), m("2022-12"));
        assert_eq!(month_diff(m("2023-11"), m("2024-02")), 3);
        assert_eq!(month_diff(m("2024-02"), m("2023-11")), -3);
    }

    #[test]
    fn test_month_serde_as_string() {
        let json = serde_json::to_string(&m("2024-06")).unwrap();
        assert_eq!(json, "\"2024-06\"");
        let back: Month = serde_json::from_str("\"2024-06\"").unwrap();
        assert_eq!(back, m("2024-06"));
        assert!(serde_json::from_str::<Month>("\"2024-00\"").is_err());
    }

    #[test]
    fn test_asset_type_labels() {
        assert_eq!("stock".parse::<AssetType>().unwrap(), AssetType::Stocks);
        assert_eq!(AssetType::TimeDeposit.as_str(), "time-deposit");
        let parsed: AssetType = serde_json::from_str("\"time-deposit\"").unwrap();
        assert_eq!(parsed, AssetType::TimeDeposit);
        assert!("crypto".parse::<AssetType>().is_err());
    }

    #[test]
    fn test_record_camel_case_fields() {
        let json = r#"{
            "id": "td-1",
            "date": "2024-01",
            "amount": 12000,
            "account": "bank",
            "assetType": "time-deposit",
            "isTimeDeposit": true,
            "depositTermMonths": 6,
            "annualInterestRate": 3
        }"#;
        let record: InvestmentRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_time_deposit);
        assert_eq!(record.snapshot, None);
        assert_eq!(record.computed_maturity(), Some(m("2024-07")));
        assert_eq!(record.annual_interest_rate, Some(dec!(3)));
    }

    #[test]
    fn test_record_set_partitions_deposits() {
        let mut records = RecordsByAssetType::new();
        records.insert(
            AssetType::Stocks,
            vec![InvestmentRecord::new(
                "s1",
                m("2024-01"),
                "broker",
                AssetType::Stocks,
                dec!(100),
                Some(dec!(100)),
            )],
        );
        records.insert(
            AssetType::TimeDeposit,
            vec![InvestmentRecord::time_deposit(
                "d1",
                m("2024-01"),
                "bank",
                dec!(1000),
                12,
                dec!(2),
            )],
        );
        let set = RecordSet::new(records, RecordsByMetalType::new());
        assert_eq!(set.ordinary_records().len(), 1);
        assert_eq!(set.time_deposits().len(), 1);
        assert_eq!(set.record_count(), 2);
        assert_eq!(set.restricted_to(&[AssetType::Stocks]).record_count(), 1);
        assert_eq!(set.latest_month(), Some(m("2024-01")));
        assert_eq!(RecordSet::default().latest_month(), None);
    }
}
