use arrow::record_batch::RecordBatch;
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::process::dedup::{dedup, KeepPolicy};
use crate::process::sort::stable_sort;
use crate::process::utils::require_column;

/// Market category column.
pub const MARKET_COLUMN: &str = "市場別";
/// Entity name column.
pub const SECURITY_NAME_COLUMN: &str = "證券名稱";
/// Record date column.
pub const RECORD_DATE_COLUMN: &str = "資料日";

/// Sort-then-dedup rule for one curated dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationRule {
    pub sort_by: Vec<String>,
    pub dedup_on: Vec<String>,
    pub keep: KeepPolicy,
}

impl NormalizationRule {
    pub fn new(sort_by: &[&str], dedup_on: &[&str], keep: KeepPolicy) -> Self {
        Self {
            sort_by: sort_by.iter().map(|s| s.to_string()).collect(),
            dedup_on: dedup_on.iter().map(|s| s.to_string()).collect(),
            keep,
        }
    }

    /// Check every column up front so a missing one fails before any work.
    pub fn apply(&self, batch: &RecordBatch, dataset: &str) -> Result<RecordBatch> {
        for column in self.sort_by.iter().chain(&self.dedup_on) {
            require_column(batch, column, dataset)?;
        }

        let sort_by: Vec<&str> = self.sort_by.iter().map(String::as_str).collect();
        let dedup_on: Vec<&str> = self.dedup_on.iter().map(String::as_str).collect();

        let sorted = stable_sort(batch, &sort_by, dataset)?;
        let out = dedup(&sorted, &dedup_on, self.keep, dataset)?;
        debug!(dataset, before = batch.num_rows(), after = out.num_rows(), "normalized");
        Ok(out)
    }
}

/// Dataset name → normalization rule. Names without a rule pass through.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: HashMap<String, NormalizationRule>,
}

impl RuleBook {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules for the trading datasets whose files overlap on (date, security).
    pub fn builtin() -> Self {
        let by_market = NormalizationRule::new(
            &[MARKET_COLUMN, SECURITY_NAME_COLUMN, RECORD_DATE_COLUMN],
            &[RECORD_DATE_COLUMN, SECURITY_NAME_COLUMN],
            KeepPolicy::First,
        );
        let by_security = NormalizationRule::new(
            &[SECURITY_NAME_COLUMN, RECORD_DATE_COLUMN],
            &[RECORD_DATE_COLUMN, SECURITY_NAME_COLUMN],
            KeepPolicy::First,
        );

        Self::empty()
            .with_rule("三大法人_融資券_當沖", by_market)
            .with_rule("股價交易資訊", by_security.clone())
            .with_rule("股票日交易註記資訊", by_security)
    }

    pub fn with_rule(mut self, dataset: impl Into<String>, rule: NormalizationRule) -> Self {
        self.rules.insert(dataset.into(), rule);
        self
    }

    pub fn rule_for(&self, dataset: &str) -> Option<&NormalizationRule> {
        self.rules.get(dataset)
    }

    pub fn apply(&self, dataset: &str, batch: RecordBatch) -> Result<RecordBatch> {
        match self.rule_for(dataset) {
            Some(rule) => rule.apply(&batch, dataset),
            None => Ok(batch),
        }
    }
}
