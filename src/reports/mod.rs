// Reports module - performance calculation engine
//
// Every calculator is a pure function over an immutable record set. Display
// windows are applied to computed series only (see `scope`).

pub mod cache;
pub mod distribution;
pub mod overall;
pub mod precious_metal;
pub mod profit;
pub mod return_rate;
pub mod scope;
pub mod series;
pub mod snapshots;
pub mod time_deposit;

pub use cache::{CacheKey, RecordVersion, SeriesCache};
pub use distribution::{calculate_asset_distribution, AssetDistribution};
pub use overall::{calculate_overall_returns, OverallMonth};
pub use precious_metal::{MetalBook, MetalLedger, MetalMonth};
pub use profit::{
    calculate_monthly_profit, calculate_monthly_profit_by_account, summarize_profit,
    ProfitSummary, SeriesByAccount,
};
pub use return_rate::{calculate_monthly_returns, calculate_monthly_returns_by_account};
pub use scope::{apply_window, DisplayWindow};
pub use series::{Series, SeriesKind};
pub use snapshots::group_snapshots_by_account;
pub use time_deposit::{deposit_schedule, DepositPosition, DepositStatus, TimeDeposit};
