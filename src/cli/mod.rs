use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Month;

pub mod formatters;

#[derive(Parser)]
#[command(name = "holdings")]
#[command(version, about = "Monthly performance engine for personal holdings")]
#[command(
    long_about = "Derive monthly profit, ROI and return rate from account snapshots, time deposits and precious metal lots. Calculations always use full history; --from/--to only narrow what is displayed."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Dataset file (defaults to `data_file` from the config)
    #[arg(long = "data", short = 'd', global = true, env = "HOLDINGS_DATA")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Display window shared by the series commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// First month to display (YYYY-MM)
    #[arg(long)]
    pub from: Option<Month>,

    /// Last month to display (YYYY-MM)
    #[arg(long)]
    pub to: Option<Month>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monthly profit, investment and ROI
    Profit {
        /// One series per account instead of the aggregate
        #[arg(long)]
        by_account: bool,

        /// Restrict to asset types (stocks, funds, bonds, time-deposit, other)
        #[arg(long = "asset-type", short = 't', value_delimiter = ',')]
        asset_types: Vec<String>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Monthly return rate
    Returns {
        /// One series per account instead of the aggregate
        #[arg(long)]
        by_account: bool,

        /// Restrict to asset types (stocks, funds, bonds, time-deposit, other)
        #[arg(long = "asset-type", short = 't', value_delimiter = ',')]
        asset_types: Vec<String>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Blended return rate across ordinary assets, deposits and metals
    Overall {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Precious metal market value and profit per month
    Metals {
        /// Only this metal type (e.g. gold)
        #[arg(long)]
        metal: Option<String>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Time deposit schedule evaluated at a month
    Deposits {
        /// Evaluation month (YYYY-MM); defaults to the latest record month
        #[arg(long)]
        at: Option<Month>,
    },

    /// Value per asset class at a month
    Distribution {
        /// Evaluation month (YYYY-MM); defaults to the latest record month
        #[arg(long)]
        at: Option<Month>,
    },

    /// Check the dataset and list validation issues
    Validate,
}
