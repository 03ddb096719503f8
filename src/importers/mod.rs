// Import module - read-only dataset loader
//
// The record store itself lives outside this crate. It hands us a JSON
// document with the canonical, already-migrated record shape:
//
//   { "records": { "<asset type>": [InvestmentRecord...] },
//     "metals":  { "<metal type>": [PreciousMetalRecord...] } }

pub mod validation;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::HoldingsError;
use crate::models::RecordSet;

pub use validation::{validate_record_set, ValidationIssue, ValidationResult};

/// Parse a dataset document and validate it
pub fn parse_dataset(json: &str) -> Result<ValidationResult> {
    let records: RecordSet = serde_json::from_str(json)
        .map_err(|e| HoldingsError::ParseError(format!("invalid dataset: {}", e)))?;

    let result = validate_record_set(records);
    for issue in &result.issues {
        warn!(
            record = %issue.record_id,
            field = %issue.field,
            dropped = issue.dropped,
            "{}",
            issue.reason
        );
    }
    Ok(result)
}

/// Load and validate a dataset file
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<ValidationResult> {
    let path = path.as_ref();
    info!("Loading dataset: {:?}", path);

    let json = fs::read_to_string(path)
        .map_err(HoldingsError::from)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    let result =
        parse_dataset(&json).with_context(|| format!("Failed to load {}", path.display()))?;

    info!(
        "Loaded {} records ({} issues)",
        result.records.record_count(),
        result.issues.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetType;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "records": {
            "stocks": [
                {"id": "1", "date": "2024-01", "amount": 100, "snapshot": 100, "account": "A", "assetType": "stocks"},
                {"id": "2", "date": "2024-02", "amount": "0", "account": "A", "assetType": "stocks"}
            ]
        },
        "metals": {
            "gold": [
                {"id": "g1", "date": "2024-01", "metalType": "gold", "account": "vault",
                 "grams": 10, "pricePerGram": 500, "averagePrice": 500}
            ]
        }
    }"#;

    #[test]
    fn test_parse_dataset() {
        let result = parse_dataset(SAMPLE).unwrap();
        assert!(!result.has_issues());
        assert_eq!(result.records.records[&AssetType::Stocks].len(), 2);
        assert_eq!(result.records.records[&AssetType::Stocks][1].snapshot, None);
        assert_eq!(result.records.metals["gold"].len(), 1);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let result = parse_dataset("{}").unwrap();
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_bad_month_is_a_parse_error() {
        let json = r#"{"records": {"stocks": [
            {"id": "1", "date": "2024-13", "amount": 1, "account": "A", "assetType": "stocks"}
        ]}}"#;
        let err = parse_dataset(json).unwrap_err();
        assert!(err.to_string().contains("parse error"));
    }

    #[test]
    fn test_load_dataset_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let result = load_dataset(&path).unwrap();
        assert_eq!(result.records.record_count(), 3);
        assert!(load_dataset(dir.path().join("missing.json")).is_err());
    }
}
