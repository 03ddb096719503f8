//! Memoized series with typed keys
//!
//! A cached entry is keyed by the record-set version, the series kind and the
//! display window. The version is a blake3 digest of the canonical JSON form of
//! the records, so any edit to the record set produces a new key. Entries are
//! always computed on full history and windowed afterwards.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::models::RecordSet;
use crate::reports::scope::DisplayWindow;
use crate::reports::series::{Series, SeriesKind};

/// Content digest identifying one state of the record set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RecordVersion([u8; 32]);

impl RecordVersion {
    pub fn of(records: &RecordSet) -> Result<Self> {
        let canonical =
            serde_json::to_vec(records).context("Failed to serialize record set for hashing")?;
        Ok(Self(*blake3::hash(&canonical).as_bytes()))
    }

    /// Short hex prefix for logs
    pub fn short(&self) -> String {
        self.0[..6].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for RecordVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub version: RecordVersion,
    pub kind: SeriesKind,
    pub window: DisplayWindow,
}

#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: HashMap<CacheKey, Series>,
    hits: usize,
    misses: usize,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the windowed series, computing it from full history on a miss
    pub fn get_or_compute(
        &mut self,
        records: &RecordSet,
        kind: SeriesKind,
        window: DisplayWindow,
    ) -> Result<Series> {
        let key = CacheKey {
            version: RecordVersion::of(records)?,
            kind,
            window,
        };

        if let Some(series) = self.entries.get(&key) {
            self.hits += 1;
            debug!(kind = %kind, version = %key.version.short(), "series cache hit");
            return Ok(series.clone());
        }

        self.misses += 1;
        debug!(kind = %kind, version = %key.version.short(), %window, "series cache miss");
        let series = Series::compute(records, kind).windowed(&window);
        self.entries.insert(key, series.clone());
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
