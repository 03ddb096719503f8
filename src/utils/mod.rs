//! Utility functions for formatting and common operations
//!
//! This module provides centralized formatting utilities for consistent
//! display of amounts, rates and ratios throughout the CLI. No currency symbol
//! is printed: the engine does not model currencies.

use rust_decimal::Decimal;

/// Core formatting function with full control over output.
///
/// Rounds to `decimals` places and groups thousands with `,`:
///
/// # Examples
/// ```
/// use holdings::utils::format_amount_with;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount_with(dec!(1234.567), 2, 0), "1,234.57");
/// assert_eq!(format_amount_with(dec!(-1234), 0, 8), "  -1,234");
/// ```
pub fn format_amount_with(value: Decimal, decimals: u32, width: usize) -> String {
    let rounded = value.round_dp(decimals);
    let is_negative = rounded < Decimal::ZERO;

    let formatted = format!("{:.prec$}", rounded.abs(), prec = decimals as usize);
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, frac)) => (int.to_string(), Some(frac.to_string())),
        None => (formatted.clone(), None),
    };

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let result = match decimal_part {
        Some(frac) => format!("{}{}.{}", sign, with_separators, frac),
        None => format!("{}{}", sign, with_separators),
    };

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

// ============ Convenience functions ============

/// Amount with two decimals: "1,234.56"
///
/// # Examples
/// ```
/// use holdings::utils::format_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount(dec!(1234.5)), "1,234.50");
/// assert_eq!(format_amount(dec!(-9000)), "-9,000.00");
/// ```
pub fn format_amount(value: Decimal) -> String {
    format_amount_with(value, 2, 0)
}

/// A value already expressed in percent: "12.50%"
pub fn format_percent(rate: Decimal, decimals: u32) -> String {
    format!("{}%", format_amount_with(rate, decimals, 0))
}

/// A ratio (0.25) shown as percent: "25.00%"
pub fn format_ratio_as_percent(ratio: Decimal, decimals: u32) -> String {
    format_percent(ratio * Decimal::ONE_HUNDRED, decimals)
}
