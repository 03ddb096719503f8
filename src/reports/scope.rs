//! Display window filtering
//!
//! Narrows an already-computed series to a caller-chosen month range. The
//! calculators always run on full history: cutting records before computing
//! would move each account's first snapshot and break consecutive-month
//! chains, changing values inside the window.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Month, MonthKeyed};

/// Inclusive month range; an open side is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayWindow {
    pub start: Option<Month>,
    pub end: Option<Month>,
}

impl DisplayWindow {
    pub fn new(start: Option<Month>, end: Option<Month>) -> Self {
        Self { start, end }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: Month, end: Month) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn contains(&self, month: Month) -> bool {
        self.start.map_or(true, |s| month >= s) && self.end.map_or(true, |e| month <= e)
    }
}

impl fmt::Display for DisplayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |m: Option<Month>| m.map(|m| m.to_string()).unwrap_or_else(|| "…".to_string());
        write!(f, "{} → {}", side(self.start), side(self.end))
    }
}

/// Keep the entries whose month lies inside `window`, preserving order and values
pub fn apply_window<T: MonthKeyed + Clone>(series: &[T], window: &DisplayWindow) -> Vec<T> {
    series
        .iter()
        .filter(|entry| window.contains(entry.month()))
        .cloned()
        .collect()
}

/// [`apply_window`] for every series of a per-key map; keys whose series becomes
/// empty are dropped
pub fn apply_window_by_key<T: MonthKeyed + Clone>(
    series: &BTreeMap<String, Vec<T>>,
    window: &DisplayWindow,
) -> BTreeMap<String, Vec<T>> {
    series
        .iter()
        .map(|(key, entries)| (key.clone(), apply_window(entries, window)))
        .filter(|(_, entries)| !entries.is_empty())
        .collect()
}
