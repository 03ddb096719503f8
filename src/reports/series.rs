//! Computed series behind one enum, so callers and the cache can treat every
//! report kind alike

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{MonthlyInvestmentData, MonthlyReturnData, RecordSet};
use crate::reports::overall::{calculate_overall_returns, OverallMonth};
use crate::reports::precious_metal::{MetalBook, MetalMonth};
use crate::reports::profit::{
    calculate_monthly_profit, calculate_monthly_profit_by_account, SeriesByAccount,
};
use crate::reports::return_rate::{calculate_monthly_returns, calculate_monthly_returns_by_account};
use crate::reports::scope::{apply_window, apply_window_by_key, DisplayWindow};

/// Which series to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Profit,
    ProfitByAccount,
    Returns,
    ReturnsByAccount,
    Overall,
    Metals,
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeriesKind::Profit => "profit",
            SeriesKind::ProfitByAccount => "profit_by_account",
            SeriesKind::Returns => "returns",
            SeriesKind::ReturnsByAccount => "returns_by_account",
            SeriesKind::Overall => "overall",
            SeriesKind::Metals => "metals",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Series {
    Profit(Vec<MonthlyInvestmentData>),
    ProfitByAccount(SeriesByAccount<MonthlyInvestmentData>),
    Returns(Vec<MonthlyReturnData>),
    ReturnsByAccount(SeriesByAccount<MonthlyReturnData>),
    Overall(Vec<OverallMonth>),
    Metals(BTreeMap<String, Vec<MetalMonth>>),
}

impl Series {
    /// Compute `kind` over the full history of `records`
    pub fn compute(records: &RecordSet, kind: SeriesKind) -> Series {
        match kind {
            SeriesKind::Profit => {
                Series::Profit(calculate_monthly_profit(&records.ordinary_records()))
            }
            SeriesKind::ProfitByAccount => Series::ProfitByAccount(
                calculate_monthly_profit_by_account(&records.ordinary_records()),
            ),
            SeriesKind::Returns => {
                Series::Returns(calculate_monthly_returns(&records.ordinary_records()))
            }
            SeriesKind::ReturnsByAccount => Series::ReturnsByAccount(
                calculate_monthly_returns_by_account(&records.ordinary_records()),
            ),
            SeriesKind::Overall => Series::Overall(calculate_overall_returns(records)),
            SeriesKind::Metals => Series::Metals(MetalBook::new(&records.metals).monthly_series()),
        }
    }

    /// Narrow an already computed series to `window`
    pub fn windowed(&self, window: &DisplayWindow) -> Series {
        match self {
            Series::Profit(s) => Series::Profit(apply_window(s, window)),
            Series::ProfitByAccount(s) => Series::ProfitByAccount(apply_window_by_key(s, window)),
            Series::Returns(s) => Series::Returns(apply_window(s, window)),
            Series::ReturnsByAccount(s) => {
                Series::ReturnsByAccount(apply_window_by_key(s, window))
            }
            Series::Overall(s) => Series::Overall(apply_window(s, window)),
            Series::Metals(s) => Series::Metals(apply_window_by_key(s, window)),
        }
    }

    pub fn kind(&self) -> SeriesKind {
        match self {
            Series::Profit(_) => SeriesKind::Profit,
            Series::ProfitByAccount(_) => SeriesKind::ProfitByAccount,
            Series::Returns(_) => SeriesKind::Returns,
            Series::ReturnsByAccount(_) => SeriesKind::ReturnsByAccount,
            Series::Overall(_) => SeriesKind::Overall,
            Series::Metals(_) => SeriesKind::Metals,
        }
    }

    /// Number of entries across all keys
    pub fn len(&self) -> usize {
        match self {
            Series::Profit(s) => s.len(),
            Series::ProfitByAccount(s) => s.values().map(Vec::len).sum(),
            Series::Returns(s) => s.len(),
            Series::ReturnsByAccount(s) => s.values().map(Vec::len).sum(),
            Series::Overall(s) => s.len(),
            Series::Metals(s) => s.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
