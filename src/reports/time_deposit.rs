//! Time deposit accrual
//!
//! Fixed-term deposits earn simple monthly interest on their principal:
//! `principal * annual_rate / 100 / 12` for each whole month after the start,
//! capped at the term. Deposits are valued from their terms alone and never
//! through snapshots.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::models::{month_diff, InvestmentRecord, Month};

/// Longest term a deposit may have (100 years); longer terms cannot accrue
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Terms of a deposit that can accrue interest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeDeposit {
    pub id: String,
    pub account: String,
    pub principal: Decimal,
    pub start: Month,
    pub term_months: u32,
    pub annual_rate: Decimal,
}

impl TimeDeposit {
    /// Extract accrual terms from a record.
    ///
    /// Returns `None` when the record is not flagged as a deposit, is missing a
    /// positive rate, or has no term within `1..=MAX_TERM_MONTHS`; such records
    /// accrue nothing.
    pub fn from_record(record: &InvestmentRecord) -> Option<Self> {
        if !record.is_time_deposit {
            return None;
        }
        let term_months = record
            .deposit_term_months
            .filter(|t| (1..=MAX_TERM_MONTHS).contains(t))?;
        let annual_rate = record.annual_interest_rate.filter(|r| *r > Decimal::ZERO)?;
        Some(Self {
            id: record.id.clone(),
            account: record.account.clone(),
            principal: record.amount,
            start: record.date,
            term_months,
            annual_rate,
        })
    }

    pub fn monthly_interest(&self) -> Decimal {
        self.principal * self.annual_rate / Decimal::from(100) / Decimal::from(12)
    }

    // Bounded so the month arithmetic below never wraps
    fn term(&self) -> u32 {
        self.term_months.min(MAX_TERM_MONTHS)
    }

    pub fn maturity(&self) -> Month {
        self.start.add_months(self.term() as i32)
    }

    /// Whole months elapsed since the start, clamped to `[0, term]`
    pub fn accrued_months(&self, month: Month) -> u32 {
        let elapsed = month_diff(self.start, month).max(0) as u32;
        elapsed.min(self.term())
    }

    /// Total interest earned up to and including `month`
    pub fn accrued_interest(&self, month: Month) -> Decimal {
        self.monthly_interest() * Decimal::from(self.accrued_months(month))
    }

    /// Interest earned in `month` alone
    pub fn marginal_interest(&self, month: Month) -> Decimal {
        self.accrued_interest(month) - self.accrued_interest(month.prev())
    }

    pub fn is_matured(&self, month: Month) -> bool {
        month >= self.maturity()
    }

    /// Principal plus accrued interest; zero before the deposit starts
    pub fn value_at(&self, month: Month) -> Decimal {
        if month < self.start {
            Decimal::ZERO
        } else {
            self.principal + self.accrued_interest(month)
        }
    }

    /// Months in which this deposit earns interest (`start + 1 ..= maturity`)
    pub fn interest_months(&self) -> Vec<Month> {
        (1..=self.term() as i32)
            .map(|i| self.start.add_months(i))
            .collect()
    }
}

/// Deposits that can accrue, skipping records that cannot (logged at debug level)
pub fn collect_deposits(records: &[InvestmentRecord]) -> Vec<TimeDeposit> {
    records
        .iter()
        .filter(|r| r.is_time_deposit)
        .filter_map(|r| {
            let deposit = TimeDeposit::from_record(r);
            if deposit.is_none() {
                debug!("Time deposit {} has no usable term/rate; accruing zero", r.id);
            }
            deposit
        })
        .collect()
}

/// Marginal interest across all deposits for one month
pub fn total_marginal_interest(deposits: &[TimeDeposit], month: Month) -> Decimal {
    deposits.iter().map(|d| d.marginal_interest(month)).sum()
}

/// Value of a flagged deposit record at `month`. A deposit whose terms cannot
/// accrue still holds its principal from the start month on.
pub fn deposit_value_at(record: &InvestmentRecord, month: Month) -> Decimal {
    match TimeDeposit::from_record(record) {
        Some(deposit) => deposit.value_at(month),
        None if month >= record.date => record.amount,
        None => Decimal::ZERO,
    }
}

/// Lifecycle state of a deposit at an evaluation month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    NotStarted,
    Accruing,
    Matured,
}

/// One row of the deposit schedule at an evaluation month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositPosition {
    pub deposit: TimeDeposit,
    pub maturity: Month,
    pub monthly_interest: Decimal,
    pub accrued_interest: Decimal,
    pub value: Decimal,
    pub status: DepositStatus,
}

/// Schedule of every usable deposit evaluated at `month`
pub fn deposit_schedule(deposits: &[TimeDeposit], month: Month) -> Vec<DepositPosition> {
    deposits
        .iter()
        .map(|d| {
            let status = if month < d.start {
                DepositStatus::NotStarted
            } else if d.is_matured(month) {
                DepositStatus::Matured
            } else {
                DepositStatus::Accruing
            };
            DepositPosition {
                deposit: d.clone(),
                maturity: d.maturity(),
                monthly_interest: d.monthly_interest(),
                accrued_interest: d.accrued_interest(month),
                value: d.value_at(month),
                status,
            }
        })
        .collect()
}
