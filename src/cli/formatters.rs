//! Terminal tables for the computed series
//!
//! Formatters take already computed and windowed data and only render it.
//! Amounts are rounded here, never in the engine.

use colored::Colorize;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::importers::ValidationIssue;
use crate::models::{Month, MonthlyInvestmentData, MonthlyReturnData};
use crate::reports::{
    summarize_profit, AssetDistribution, DepositPosition, DepositStatus, MetalMonth, OverallMonth,
};
use crate::utils::{format_amount_with, format_percent, format_ratio_as_percent};

/// Green for gains, red for losses
fn signed(text: String, value: Decimal) -> String {
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn signed_amount(value: Decimal, decimals: u32) -> String {
    signed(format_amount_with(value, decimals, 0), value)
}

fn render(table: &mut Table, numeric_from: usize) -> String {
    table.with(Style::modern());
    table.modify(Columns::new(numeric_from..), Alignment::right());
    table.to_string()
}

fn section(title: &str) -> String {
    format!("\n{} {}\n\n", "📈".cyan().bold(), title.bold())
}

#[derive(Tabled)]
struct ProfitRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Investment")]
    investment: String,
    #[tabled(rename = "ROI")]
    roi: String,
}

fn profit_rows(series: &[MonthlyInvestmentData], decimals: u32) -> Vec<ProfitRow> {
    series
        .iter()
        .map(|e| ProfitRow {
            month: e.month.to_string(),
            profit: signed_amount(e.profit, decimals),
            investment: format_amount_with(e.investment, decimals, 0),
            roi: signed(format_ratio_as_percent(e.roi, decimals), e.roi),
        })
        .collect()
}

fn profit_summary(series: &[MonthlyInvestmentData], decimals: u32) -> String {
    let summary = summarize_profit(series);
    format!(
        "\n{:<20} {}\n{:<20} {}\n{:<20} {}\n",
        "Total Profit:".bold(),
        signed_amount(summary.total_profit, decimals),
        "Total Investment:".bold(),
        format_amount_with(summary.total_investment, decimals, 0),
        "ROI:".bold(),
        signed(format_ratio_as_percent(summary.roi, decimals), summary.roi),
    )
}

/// Aggregate monthly profit table with totals
pub fn format_profit_table(series: &[MonthlyInvestmentData], decimals: u32) -> String {
    if series.is_empty() {
        return format_empty("No profit entries in range");
    }
    let mut output = section("Monthly Profit");
    output.push_str(&render(&mut Table::new(profit_rows(series, decimals)), 1));
    output.push('\n');
    output.push_str(&profit_summary(series, decimals));
    output
}

/// One profit table per account
pub fn format_profit_by_account(
    series: &BTreeMap<String, Vec<MonthlyInvestmentData>>,
    decimals: u32,
) -> String {
    if series.is_empty() {
        return format_empty("No profit entries in range");
    }
    let mut output = String::new();
    for (account, entries) in series {
        output.push_str(&section(&format!("Monthly Profit - {}", account)));
        output.push_str(&render(&mut Table::new(profit_rows(entries, decimals)), 1));
        output.push('\n');
        output.push_str(&profit_summary(entries, decimals));
    }
    output
}

#[derive(Tabled)]
struct ReturnRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Investment")]
    investment: String,
    #[tabled(rename = "Previous Value")]
    previous: String,
    #[tabled(rename = "Return %")]
    rate: String,
}

fn return_rows(series: &[MonthlyReturnData], decimals: u32) -> Vec<ReturnRow> {
    series
        .iter()
        .map(|e| ReturnRow {
            month: e.month.to_string(),
            profit: signed_amount(e.profit, decimals),
            investment: format_amount_with(e.investment, decimals, 0),
            previous: format_amount_with(e.previous_snapshot_value, decimals, 0),
            rate: signed(format_percent(e.return_rate, decimals), e.return_rate),
        })
        .collect()
}

pub fn format_returns_table(series: &[MonthlyReturnData], decimals: u32) -> String {
    if series.is_empty() {
        return format_empty("No return entries in range");
    }
    let mut output = section("Monthly Return Rate");
    output.push_str(&render(&mut Table::new(return_rows(series, decimals)), 1));
    output.push('\n');
    output
}

pub fn format_returns_by_account(
    series: &BTreeMap<String, Vec<MonthlyReturnData>>,
    decimals: u32,
) -> String {
    if series.is_empty() {
        return format_empty("No return entries in range");
    }
    let mut output = String::new();
    for (account, entries) in series {
        output.push_str(&section(&format!("Monthly Return Rate - {}", account)));
        output.push_str(&render(&mut Table::new(return_rows(entries, decimals)), 1));
        output.push('\n');
    }
    output
}

pub fn format_overall_table(series: &[OverallMonth], decimals: u32) -> String {
    if series.is_empty() {
        return format_empty("No entries in range");
    }

    #[derive(Tabled)]
    struct OverallRow {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Ordinary")]
        ordinary: String,
        #[tabled(rename = "Deposits")]
        deposits: String,
        #[tabled(rename = "Metals")]
        metals: String,
        #[tabled(rename = "Profit")]
        profit: String,
        #[tabled(rename = "Investment")]
        investment: String,
        #[tabled(rename = "Baseline")]
        baseline: String,
        #[tabled(rename = "Return %")]
        rate: String,
    }

    let rows: Vec<OverallRow> = series
        .iter()
        .map(|e| OverallRow {
            month: e.month.to_string(),
            ordinary: format_amount_with(e.ordinary_profit, decimals, 0),
            deposits: format_amount_with(e.deposit_profit, decimals, 0),
            metals: format_amount_with(e.metal_profit, decimals, 0),
            profit: signed_amount(e.profit, decimals),
            investment: format_amount_with(e.investment, decimals, 0),
            baseline: format_amount_with(e.previous_value, decimals, 0),
            rate: signed(format_percent(e.return_rate, decimals), e.return_rate),
        })
        .collect();

    let mut output = section("Overall Return Rate");
    output.push_str(&render(&mut Table::new(rows), 1));
    output.push('\n');
    output
}

pub fn format_metals_table(series: &BTreeMap<String, Vec<MetalMonth>>, decimals: u32) -> String {
    if series.is_empty() {
        return format_empty("No priced metal months in range");
    }

    #[derive(Tabled)]
    struct MetalRow {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Grams")]
        grams: String,
        #[tabled(rename = "Market Value")]
        value: String,
        #[tabled(rename = "Profit")]
        profit: String,
        #[tabled(rename = "Lifetime Profit")]
        lifetime: String,
    }

    let mut output = String::new();
    for (metal, entries) in series {
        let rows: Vec<MetalRow> = entries
            .iter()
            .map(|e| MetalRow {
                month: e.month.to_string(),
                grams: format_amount_with(e.grams, decimals, 0),
                value: format_amount_with(e.market_value, decimals, 0),
                profit: signed_amount(e.profit, decimals),
                lifetime: signed_amount(e.cumulative_profit, decimals),
            })
            .collect();
        output.push_str(&section(&format!("Metal - {}", metal)));
        output.push_str(&render(&mut Table::new(rows), 1));
        output.push('\n');
    }
    output
}

pub fn format_deposits_table(positions: &[DepositPosition], at: Month, decimals: u32) -> String {
    if positions.is_empty() {
        return format_empty("No time deposits found");
    }

    #[derive(Tabled)]
    struct DepositRow {
        #[tabled(rename = "Id")]
        id: String,
        #[tabled(rename = "Account")]
        account: String,
        #[tabled(rename = "Start")]
        start: String,
        #[tabled(rename = "Maturity")]
        maturity: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Principal")]
        principal: String,
        #[tabled(rename = "Rate")]
        rate: String,
        #[tabled(rename = "Monthly")]
        monthly: String,
        #[tabled(rename = "Accrued")]
        accrued: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows: Vec<DepositRow> = positions
        .iter()
        .map(|p| DepositRow {
            id: p.deposit.id.clone(),
            account: p.deposit.account.clone(),
            start: p.deposit.start.to_string(),
            maturity: p.maturity.to_string(),
            status: match p.status {
                DepositStatus::NotStarted => "not started".bright_black().to_string(),
                DepositStatus::Accruing => "accruing".green().to_string(),
                DepositStatus::Matured => "matured".yellow().to_string(),
            },
            principal: format_amount_with(p.deposit.principal, decimals, 0),
            rate: format_percent(p.deposit.annual_rate, decimals),
            monthly: format_amount_with(p.monthly_interest, decimals, 0),
            accrued: format_amount_with(p.accrued_interest, decimals, 0),
            value: format_amount_with(p.value, decimals, 0),
        })
        .collect();

    let total: Decimal = positions.iter().map(|p| p.value).sum();
    let mut output = section(&format!("Time Deposits at {}", at));
    output.push_str(&render(&mut Table::new(rows), 5));
    output.push_str(&format!(
        "\n\n{:<20} {}\n",
        "Total Value:".bold(),
        format_amount_with(total, decimals, 0)
    ));
    output
}

pub fn format_distribution_table(distribution: &AssetDistribution, decimals: u32) -> String {
    if distribution.slices.is_empty() {
        return format_empty(&format!("Nothing held at {}", distribution.month));
    }

    #[derive(Tabled)]
    struct SliceRow {
        #[tabled(rename = "Asset")]
        label: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Share")]
        share: String,
    }

    let rows: Vec<SliceRow> = distribution
        .slices
        .iter()
        .map(|s| SliceRow {
            label: s.label.clone(),
            value: format_amount_with(s.value, decimals, 0),
            share: format_percent(s.share_pct, decimals),
        })
        .collect();

    let mut output = section(&format!("Asset Distribution at {}", distribution.month));
    output.push_str(&render(&mut Table::new(rows), 1));
    output.push_str(&format!(
        "\n\n{:<20} {}\n",
        "Total:".bold(),
        format_amount_with(distribution.total, decimals, 0)
    ));
    output
}

pub fn format_issues_table(issues: &[ValidationIssue]) -> String {
    if issues.is_empty() {
        return format!("{} No validation issues found\n", "✓".green().bold());
    }

    #[derive(Tabled)]
    struct IssueRow {
        #[tabled(rename = "Record")]
        record: String,
        #[tabled(rename = "Field")]
        field: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Issue")]
        reason: String,
        #[tabled(rename = "Action")]
        action: String,
    }

    let rows: Vec<IssueRow> = issues
        .iter()
        .map(|i| IssueRow {
            record: i.record_id.clone(),
            field: i.field.clone(),
            value: i.value.clone(),
            reason: match &i.suggestion {
                Some(s) => format!("{} ({})", i.reason, s),
                None => i.reason.clone(),
            },
            action: if i.dropped {
                "dropped".red().to_string()
            } else {
                "kept".yellow().to_string()
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    format!(
        "\n{} {} validation issue(s)\n\n{}\n",
        "⚠".yellow().bold(),
        issues.len(),
        table
    )
}

/// Friendly message for an empty result
pub fn format_empty(message: &str) -> String {
    format!("{} {}\n", "ℹ".blue().bold(), message)
}
