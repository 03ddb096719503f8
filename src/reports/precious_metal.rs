//! Precious metal valuation
//!
//! Metal lots are valued from the market price recorded with the lots of each
//! month, independently of account snapshots. There are two query modes:
//!
//! - profit mode ([`MetalLedger::market_value`]): a month without a recorded
//!   price is worth zero, so it contributes nothing to the profit series;
//! - display mode ([`MetalLedger::market_value_forward_filled`]): the last
//!   known price is carried forward, for asset-distribution views.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Month, PreciousMetalRecord, RecordsByMetalType};

/// Lots of a single metal type, indexed by month
#[derive(Debug, Clone, Default)]
pub struct MetalLedger {
    /// grams bought per month
    grams: BTreeMap<Month, Decimal>,
    /// purchase cost (grams x price per gram) per month
    cost: BTreeMap<Month, Decimal>,
    /// market price recorded in each month; the last lot of a month wins
    prices: BTreeMap<Month, Decimal>,
}

impl MetalLedger {
    pub fn from_lots(lots: &[PreciousMetalRecord]) -> Self {
        let mut ledger = MetalLedger::default();
        for lot in lots {
            *ledger.grams.entry(lot.date).or_insert(Decimal::ZERO) += lot.grams;
            *ledger.cost.entry(lot.date).or_insert(Decimal::ZERO) += lot.purchase_cost();
            if let Some(price) = lot.average_price.filter(|p| *p > Decimal::ZERO) {
                ledger.prices.insert(lot.date, price);
            }
        }
        ledger
    }

    /// Months in which at least one lot was recorded
    pub fn months(&self) -> impl Iterator<Item = Month> + '_ {
        self.grams.keys().copied()
    }

    /// Months with a recorded market price
    pub fn priced_months(&self) -> impl Iterator<Item = Month> + '_ {
        self.prices.keys().copied()
    }

    pub fn price_in(&self, month: Month) -> Option<Decimal> {
        self.prices.get(&month).copied()
    }

    /// Most recent price recorded at or before `month`
    pub fn last_known_price(&self, month: Month) -> Option<Decimal> {
        self.prices.range(..=month).next_back().map(|(_, p)| *p)
    }

    pub fn cumulative_grams(&self, month: Month) -> Decimal {
        self.grams.range(..=month).map(|(_, g)| *g).sum()
    }

    pub fn cumulative_cost(&self, month: Month) -> Decimal {
        self.cost.range(..=month).map(|(_, c)| *c).sum()
    }

    /// Cost of lots dated exactly `month`
    pub fn purchase_cost_in(&self, month: Month) -> Decimal {
        self.cost.get(&month).copied().unwrap_or(Decimal::ZERO)
    }

    /// Profit-mode valuation: zero when `month` has no recorded price
    pub fn market_value(&self, month: Month) -> Decimal {
        match self.price_in(month) {
            Some(price) => self.cumulative_grams(month) * price,
            None => Decimal::ZERO,
        }
    }

    /// Display-mode valuation: carries the last known price forward
    pub fn market_value_forward_filled(&self, month: Month) -> Decimal {
        match self.last_known_price(month) {
            Some(price) => self.cumulative_grams(month) * price,
            None => Decimal::ZERO,
        }
    }

    /// `mv(M) - mv(M-1) - cost(M)`; zero for an unpriced month
    pub fn monthly_profit(&self, month: Month) -> Decimal {
        if self.price_in(month).is_none() {
            return Decimal::ZERO;
        }
        self.market_value(month) - self.market_value(month.prev()) - self.purchase_cost_in(month)
    }

    /// Lifetime profit: `mv(M) - cumulative_cost(M)`
    pub fn cumulative_profit(&self, month: Month) -> Decimal {
        self.market_value(month) - self.cumulative_cost(month)
    }
}

/// Per-month figures for one metal type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetalMonth {
    pub month: Month,
    pub grams: Decimal,
    pub market_value: Decimal,
    pub profit: Decimal,
    pub cumulative_profit: Decimal,
}

impl crate::models::MonthKeyed for MetalMonth {
    fn month(&self) -> Month {
        self.month
    }
}

/// Ledgers for every metal type
#[derive(Debug, Clone, Default)]
pub struct MetalBook {
    ledgers: BTreeMap<String, MetalLedger>,
}

impl MetalBook {
    pub fn new(metals: &RecordsByMetalType) -> Self {
        let ledgers = metals
            .iter()
            .filter(|(_, lots)| !lots.is_empty())
            .map(|(metal, lots)| (metal.clone(), MetalLedger::from_lots(lots)))
            .collect();
        Self { ledgers }
    }

    pub fn ledger(&self, metal_type: &str) -> Option<&MetalLedger> {
        self.ledgers.get(metal_type)
    }

    pub fn metal_types(&self) -> impl Iterator<Item = &str> {
        self.ledgers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    /// Every month with a lot of any metal type
    pub fn months(&self) -> Vec<Month> {
        let mut months: Vec<Month> = self.ledgers.values().flat_map(|l| l.months()).collect();
        months.sort();
        months.dedup();
        months
    }

    /// Monthly profit summed across metal types
    pub fn monthly_profit(&self, month: Month) -> Decimal {
        self.ledgers.values().map(|l| l.monthly_profit(month)).sum()
    }

    /// Profit-mode market value summed across metal types
    pub fn market_value(&self, month: Month) -> Decimal {
        self.ledgers.values().map(|l| l.market_value(month)).sum()
    }

    /// Display-mode market value summed across metal types
    pub fn market_value_forward_filled(&self, month: Month) -> Decimal {
        self.ledgers
            .values()
            .map(|l| l.market_value_forward_filled(month))
            .sum()
    }

    /// Purchase cost of lots dated exactly `month`, across metal types
    pub fn purchase_cost_in(&self, month: Month) -> Decimal {
        self.ledgers.values().map(|l| l.purchase_cost_in(month)).sum()
    }

    /// Monthly series per metal type over the months that carry a price
    pub fn monthly_series(&self) -> BTreeMap<String, Vec<MetalMonth>> {
        self.ledgers
            .iter()
            .map(|(metal, ledger)| {
                let series = ledger
                    .priced_months()
                    .map(|month| MetalMonth {
                        month,
                        grams: ledger.cumulative_grams(month),
                        market_value: ledger.market_value(month),
                        profit: ledger.monthly_profit(month),
                        cumulative_profit: ledger.cumulative_profit(month),
                    })
                    .collect();
                (metal.clone(), series)
            })
            .collect()
    }

    /// Per-metal monthly market value map
    pub fn market_value_map(&self) -> BTreeMap<String, BTreeMap<Month, Decimal>> {
        self.series_map(|m| m.market_value)
    }

    /// Per-metal monthly profit map
    pub fn profit_map(&self) -> BTreeMap<String, BTreeMap<Month, Decimal>> {
        self.series_map(|m| m.profit)
    }

    fn series_map(
        &self,
        pick: impl Fn(&MetalMonth) -> Decimal,
    ) -> BTreeMap<String, BTreeMap<Month, Decimal>> {
        self.monthly_series()
            .into_iter()
            .map(|(metal, series)| {
                let map = series.iter().map(|m| (m.month, pick(m))).collect();
                (metal, map)
            })
            .collect()
    }
}
