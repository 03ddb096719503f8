//! Holdings - monthly performance engine for personal holdings
//!
//! This library derives monthly profit, ROI and return rate from account
//! snapshots, fixed-term deposits and precious metal lots, per account and
//! blended across every asset class.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod importers;
pub mod models;
pub mod reports;
pub mod utils;
