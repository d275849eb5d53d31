//! Data models for ingestion
//!
//! Aggregates produced by one ingestion pass.

use prices_common::PriceRecord;
use std::collections::BTreeSet;

use super::validator::RejectReason;

/// A row or member that was skipped during a pass
#[derive(Debug, Clone, PartialEq)]
pub struct RowRejection {
    /// Archive member the row came from
    pub member: String,
    /// 1-based CSV record number within the member; the header is record 1
    pub row: u64,
    pub reason: RejectReason,
}

/// Result of one ingestion pass
///
/// Counters only cover rows that were handed to the sink. `rejections` is the
/// diagnostic channel for recoverable problems and never affects the totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestionReport {
    pub item_count: u64,
    pub categories: BTreeSet<String>,
    pub total_price: f64,
    pub rejections: Vec<RowRejection>,
}

impl IngestionReport {
    /// Fold an accepted record into the running totals
    pub fn accept(&mut self, record: &PriceRecord) {
        self.item_count += 1;
        self.total_price += record.price;
        if !self.categories.contains(&record.category) {
            self.categories.insert(record.category.clone());
        }
    }

    /// Record a recoverable rejection
    pub fn reject(&mut self, member: &str, row: u64, reason: RejectReason) {
        tracing::warn!(member = %member, row, reason = %reason, "Skipping CSV record");
        self.rejections.push(RowRejection {
            member: member.to_string(),
            row,
            reason,
        });
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn skipped(&self) -> usize {
        self.rejections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, price: f64) -> PriceRecord {
        PriceRecord {
            name: "item".to_string(),
            category: category.to_string(),
            price,
            create_date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn test_accept_accumulates() {
        let mut report = IngestionReport::default();
        report.accept(&record("Tools", 9.99));
        report.accept(&record("Tools", 19.50));
        report.accept(&record("Garden", 1.0));

        assert_eq!(report.item_count, 3);
        assert_eq!(report.category_count(), 2);
        assert_eq!(report.total_price, 9.99 + 19.50 + 1.0);
        assert_eq!(report.skipped(), 0);
    }

    #[test]
    fn test_reject_does_not_touch_totals() {
        let mut report = IngestionReport::default();
        report.reject("a.csv", 4, RejectReason::MalformedRow(3));

        assert_eq!(report.item_count, 0);
        assert_eq!(report.total_price, 0.0);
        assert_eq!(
            report.rejections,
            vec![RowRejection {
                member: "a.csv".to_string(),
                row: 4,
                reason: RejectReason::MalformedRow(3),
            }]
        );
    }
}
