//! Record validation module
//!
//! Checks a loaded record set against the record invariants, collecting all
//! issues instead of failing on the first one. Most issues are informational:
//! the engine already degrades on them (a deposit without a term accrues
//! nothing). Metal lots without a positive quantity or price cannot be valued
//! at all and are dropped.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::models::{InvestmentRecord, PreciousMetalRecord, RecordSet};
use crate::reports::time_deposit::MAX_TERM_MONTHS;

/// A validation issue found in the record set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Id of the offending record
    pub record_id: String,
    /// Field name that has the issue (e.g., "grams", "depositTermMonths")
    pub field: String,
    /// The problematic value
    pub value: String,
    /// Description of why this is an issue
    pub reason: String,
    /// Suggestion for fixing the issue (if available)
    pub suggestion: Option<String>,
    /// Whether the record was removed from the set handed to the engine
    pub dropped: bool,
}

impl ValidationIssue {
    pub fn new(
        record_id: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            suggestion: None,
            dropped: false,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    fn dropped(mut self) -> Self {
        self.dropped = true;
        self
    }
}

/// Result of validation: the usable record set and any issues found
#[derive(Debug)]
pub struct ValidationResult {
    pub records: RecordSet,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Count issues by field for summary reporting
    pub fn issue_summary(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for issue in &self.issues {
            *summary.entry(issue.field.clone()).or_insert(0) += 1;
        }
        summary
    }
}

/// Validate a record set, dropping metal lots that cannot be valued
pub fn validate_record_set(records: RecordSet) -> ValidationResult {
    let mut issues = Vec::new();
    let mut seen_ids = HashSet::new();

    for (asset_type, list) in &records.records {
        for record in list {
            if !seen_ids.insert(record.id.clone()) {
                issues.push(ValidationIssue::new(
                    &record.id,
                    "id",
                    &record.id,
                    "Duplicate record id",
                ));
            }
            if record.asset_type != *asset_type {
                issues.push(
                    ValidationIssue::new(
                        &record.id,
                        "assetType",
                        record.asset_type.as_str(),
                        format!("Record listed under '{}'", asset_type),
                    )
                    .with_suggestion("Move the record under its own asset type"),
                );
            }
            if record.is_time_deposit {
                issues.extend(validate_time_deposit(record));
            }
        }
    }

    let mut metals = records.metals;
    for (metal_type, lots) in metals.iter_mut() {
        lots.retain(|lot| {
            if !seen_ids.insert(lot.id.clone()) {
                issues.push(ValidationIssue::new(&lot.id, "id", &lot.id, "Duplicate record id"));
            }
            if lot.metal_type != *metal_type {
                issues.push(ValidationIssue::new(
                    &lot.id,
                    "metalType",
                    &lot.metal_type,
                    format!("Lot listed under '{}'", metal_type),
                ));
            }
            match validate_metal_lot(lot) {
                Some(issue) => {
                    issues.push(issue.dropped());
                    false
                }
                None => {
                    if let Some(price) = lot.average_price.filter(|p| *p <= Decimal::ZERO) {
                        issues.push(
                            ValidationIssue::new(
                                &lot.id,
                                "averagePrice",
                                price.to_string(),
                                "Market price must be positive; month treated as unpriced",
                            )
                            .with_suggestion("Record the month's market price per gram"),
                        );
                    }
                    true
                }
            }
        });
    }

    ValidationResult {
        records: RecordSet {
            records: records.records,
            metals,
        },
        issues,
    }
}

fn validate_time_deposit(record: &InvestmentRecord) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    match record.deposit_term_months {
        Some(term) if term > MAX_TERM_MONTHS => issues.push(
            ValidationIssue::new(
                &record.id,
                "depositTermMonths",
                term.to_string(),
                format!(
                    "Term longer than {} months; it will accrue no interest",
                    MAX_TERM_MONTHS
                ),
            )
            .with_suggestion("Check the term is given in months"),
        ),
        Some(term) if term > 0 => {}
        other => issues.push(
            ValidationIssue::new(
                &record.id,
                "depositTermMonths",
                other.map(|t| t.to_string()).unwrap_or_else(|| "missing".to_string()),
                "Time deposit needs a positive term; it will accrue no interest",
            )
            .with_suggestion("Set depositTermMonths to the deposit term in months"),
        ),
    }

    match record.annual_interest_rate {
        Some(rate) if rate > Decimal::ZERO => {}
        other => issues.push(
            ValidationIssue::new(
                &record.id,
                "annualInterestRate",
                other.map(|r| r.to_string()).unwrap_or_else(|| "missing".to_string()),
                "Time deposit needs a positive annual rate; it will accrue no interest",
            )
            .with_suggestion("Set annualInterestRate as a percentage, e.g. 3.5"),
        ),
    }

    if let (Some(stored), Some(computed)) = (record.maturity_date, record.computed_maturity()) {
        if stored != computed {
            issues.push(ValidationIssue::new(
                &record.id,
                "maturityDate",
                stored.to_string(),
                format!("Stored maturity ignored; date + term gives {}", computed),
            ));
        }
    }

    issues
}

fn validate_metal_lot(lot: &PreciousMetalRecord) -> Option<ValidationIssue> {
    if lot.grams <= Decimal::ZERO {
        return Some(
            ValidationIssue::new(&lot.id, "grams", lot.grams.to_string(), "Lot quantity must be positive")
                .with_suggestion("Record the purchased quantity in grams"),
        );
    }
    if lot.price_per_gram <= Decimal::ZERO {
        return Some(ValidationIssue::new(
            &lot.id,
            "pricePerGram",
            lot.price_per_gram.to_string(),
            "Purchase price must be positive",
        ));
    }
    None
}
