//! Command dispatcher that routes parsed CLI commands to their handlers.
//!
//! Every handler loads the dataset once, computes on the full history and only
//! then narrows the result to the requested display window.

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

use crate::cli::formatters;
use crate::cli::{Cli, Commands, WindowArgs};
use crate::config::Config;
use crate::error::HoldingsError;
use crate::importers::{load_dataset, ValidationResult};
use crate::models::{AssetType, Month, RecordSet};
use crate::reports::{
    calculate_asset_distribution, deposit_schedule, DisplayWindow, MetalBook, Series, SeriesKind,
};
use crate::reports::time_deposit::collect_deposits;

/// Per-invocation settings shared by the handlers
struct Context<'a> {
    config: &'a Config,
    data: Option<PathBuf>,
    json: bool,
}

impl Context<'_> {
    fn dataset_path(&self) -> Result<PathBuf> {
        self.data
            .clone()
            .or_else(|| self.config.data_file.clone())
            .ok_or_else(|| {
                HoldingsError::ConfigError(
                    "no dataset given: pass --data or set data_file in the config".to_string(),
                )
                .into()
            })
    }

    fn load(&self) -> Result<ValidationResult> {
        load_dataset(self.dataset_path()?)
    }

    fn records(&self) -> Result<RecordSet> {
        Ok(self.load()?.records)
    }

    fn window(&self, args: &WindowArgs) -> DisplayWindow {
        self.config.display_window(args.from, args.to)
    }
}

/// Route a parsed command line to its handler
pub fn dispatch(cli: Cli, config: &Config) -> Result<()> {
    let ctx = Context {
        config,
        data: cli.data,
        json: cli.json,
    };

    match cli.command {
        Commands::Profit {
            by_account,
            asset_types,
            window,
        } => {
            let kind = if by_account {
                SeriesKind::ProfitByAccount
            } else {
                SeriesKind::Profit
            };
            dispatch_series(&ctx, kind, &asset_types, &window)
        }
        Commands::Returns {
            by_account,
            asset_types,
            window,
        } => {
            let kind = if by_account {
                SeriesKind::ReturnsByAccount
            } else {
                SeriesKind::Returns
            };
            dispatch_series(&ctx, kind, &asset_types, &window)
        }
        Commands::Overall { window } => dispatch_series(&ctx, SeriesKind::Overall, &[], &window),
        Commands::Metals { metal, window } => dispatch_metals(&ctx, metal.as_deref(), &window),
        Commands::Deposits { at } => dispatch_deposits(&ctx, at),
        Commands::Distribution { at } => dispatch_distribution(&ctx, at),
        Commands::Validate => dispatch_validate(&ctx),
    }
}

/// Parse `--asset-type` values; an empty list keeps every type
fn parse_asset_types(values: &[String]) -> Result<Vec<AssetType>> {
    values
        .iter()
        .map(|v| v.parse::<AssetType>().map_err(Into::into))
        .collect()
}

/// Full-history computation, narrowed to `window` afterwards
fn compute(kind: SeriesKind, records: &RecordSet, window: &DisplayWindow) -> Series {
    let series = Series::compute(records, kind).windowed(window);
    info!(kind = %kind, entries = series.len(), window = %window, "series computed");
    series
}

fn dispatch_series(
    ctx: &Context,
    kind: SeriesKind,
    asset_types: &[String],
    window: &WindowArgs,
) -> Result<()> {
    let mut records = ctx.records()?;
    let selected = parse_asset_types(asset_types)?;
    if !selected.is_empty() {
        records = records.restricted_to(&selected);
    }

    let window = ctx.window(window);
    let series = compute(kind, &records, &window);
    print_series(ctx, &series)
}

fn print_series(ctx: &Context, series: &Series) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(series)?);
        return Ok(());
    }

    let decimals = ctx.config.decimals;
    let output = match series {
        Series::Profit(s) => formatters::format_profit_table(s, decimals),
        Series::ProfitByAccount(s) => formatters::format_profit_by_account(s, decimals),
        Series::Returns(s) => formatters::format_returns_table(s, decimals),
        Series::ReturnsByAccount(s) => formatters::format_returns_by_account(s, decimals),
        Series::Overall(s) => formatters::format_overall_table(s, decimals),
        Series::Metals(s) => formatters::format_metals_table(s, decimals),
    };
    print!("{}", output);
    Ok(())
}

type MetalMaps = BTreeMap<String, BTreeMap<Month, Decimal>>;

/// Keep the selected metal types and the months inside `window`
fn narrow_metal_maps(
    mut maps: MetalMaps,
    metal: Option<&str>,
    window: &DisplayWindow,
) -> MetalMaps {
    if let Some(wanted) = metal {
        maps.retain(|name, _| name.eq_ignore_ascii_case(wanted));
    }
    for by_month in maps.values_mut() {
        by_month.retain(|month, _| window.contains(*month));
    }
    maps.retain(|_, by_month| !by_month.is_empty());
    maps
}

fn dispatch_metals(ctx: &Context, metal: Option<&str>, window: &WindowArgs) -> Result<()> {
    let records = ctx.records()?;
    let window = ctx.window(window);
    let series = match compute(SeriesKind::Metals, &records, &window) {
        Series::Metals(mut by_metal) => {
            if let Some(wanted) = metal {
                by_metal.retain(|name, _| name.eq_ignore_ascii_case(wanted));
            }
            Series::Metals(by_metal)
        }
        other => other,
    };

    if ctx.json {
        let book = MetalBook::new(&records.metals);
        let payload = serde_json::json!({
            "series": series,
            "market_value": narrow_metal_maps(book.market_value_map(), metal, &window),
            "profit": narrow_metal_maps(book.profit_map(), metal, &window),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    print_series(ctx, &series)
}

/// Evaluation month: explicit `--at`, else the latest dated record
fn evaluation_month(at: Option<Month>, records: &RecordSet) -> Option<Month> {
    at.or_else(|| records.latest_month())
}

fn dispatch_deposits(ctx: &Context, at: Option<Month>) -> Result<()> {
    let records = ctx.records()?;
    let deposits = collect_deposits(&records.time_deposits());

    let Some(month) = evaluation_month(at, &records) else {
        print!("{}", formatters::format_empty("No records found"));
        return Ok(());
    };
    let schedule = deposit_schedule(&deposits, month);

    if ctx.json {
        let payload = serde_json::json!({
            "at": month,
            "deposits": schedule,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!(
            "{}",
            formatters::format_deposits_table(&schedule, month, ctx.config.decimals)
        );
    }
    Ok(())
}

fn dispatch_distribution(ctx: &Context, at: Option<Month>) -> Result<()> {
    let records = ctx.records()?;
    let Some(month) = evaluation_month(at, &records) else {
        print!("{}", formatters::format_empty("No records found"));
        return Ok(());
    };
    let distribution = calculate_asset_distribution(&records, month);

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&distribution)?);
    } else {
        print!(
            "{}",
            formatters::format_distribution_table(&distribution, ctx.config.decimals)
        );
    }
    Ok(())
}

/// Print every issue; a dataset with issues exits non-zero
fn dispatch_validate(ctx: &Context) -> Result<()> {
    let result = ctx.load()?;

    if ctx.json {
        let payload = serde_json::json!({
            "records": result.records.record_count(),
            "issues": result.issues,
            "summary": result.issue_summary(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "{} {} records loaded",
            "✓".green().bold(),
            result.records.record_count()
        );
        print!("{}", formatters::format_issues_table(&result.issues));
    }

    if result.has_issues() {
        return Err(HoldingsError::ValidationError(format!(
            "{} issue(s) found",
            result.issues.len()
        ))
        .into());
    }
    Ok(())
}
