//! Archive pipeline tests that need no database
//!
//! Drives `run_archive` over real zip and tar files on disk with an
//! in-memory sink.
//!
//! Coverage includes:
//! - Totals for the sample upload in both formats
//! - Member filtering and ordering
//! - Malformed archives

use prices_common::{ArchiveKind, PriceRecord};
use prices_server::ingest::{run_archive, IngestError, IngestionReport, RecordSink, RejectReason};

mod helpers;
use helpers::*;

#[derive(Default)]
struct VecSink {
    rows: Vec<PriceRecord>,
}

impl RecordSink for VecSink {
    fn insert(&mut self, record: &PriceRecord) -> Result<(), sqlx::Error> {
        self.rows.push(record.clone());
        Ok(())
    }
}

fn ingest(bytes: &[u8], kind: ArchiveKind) -> (Result<IngestionReport, IngestError>, VecSink) {
    let file = spool(bytes);
    let mut sink = VecSink::default();
    let result = run_archive(file.path(), kind, &mut sink);
    (result, sink)
}

#[test]
fn test_sample_zip_totals() {
    let bytes = zip_archive(&[("prices.csv", &sample_csv())]);
    let (result, sink) = ingest(&bytes, ArchiveKind::Zip);
    let report = result.unwrap();

    assert_eq!(report.item_count, 2);
    assert_eq!(report.category_count(), 1);
    assert!((report.total_price - 29.49).abs() < 1e-9);
    assert_eq!(report.skipped(), 1);
    assert_eq!(sink.rows.len(), 2);
}

#[test]
fn test_sample_tar_totals_match_zip() {
    let zip = zip_archive(&[("prices.csv", &sample_csv())]);
    let tar = tar_archive(&[("prices.csv", &sample_csv())]);

    let (zip_report, _) = ingest(&zip, ArchiveKind::Zip);
    let (tar_report, tar_sink) = ingest(&tar, ArchiveKind::Tar);
    let (zip_report, tar_report) = (zip_report.unwrap(), tar_report.unwrap());

    assert_eq!(zip_report.item_count, tar_report.item_count);
    assert_eq!(zip_report.categories, tar_report.categories);
    assert_eq!(zip_report.total_price, tar_report.total_price);
    assert_eq!(tar_sink.rows[0].name, "Widget");
    assert_eq!(tar_sink.rows[1].name, "Gadget");
}

#[test]
fn test_members_are_read_in_archive_order() {
    let a = csv_file(&["1,First,A,1.00,2023-01-01"]);
    let b = csv_file(&["2,Second,B,2.00,2023-01-01"]);
    let bytes = zip_archive(&[
        ("b/second.csv", &b),
        ("README.md", "not data"),
        ("a/first.CSV", &a),
    ]);

    let (result, sink) = ingest(&bytes, ArchiveKind::Zip);
    let report = result.unwrap();

    assert_eq!(report.item_count, 2);
    assert_eq!(report.category_count(), 2);
    let names: Vec<_> = sink.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[test]
fn test_archive_without_csv_members_is_empty() {
    let bytes = tar_archive(&[("notes.txt", "hello"), ("data.json", "{}")]);
    let (result, sink) = ingest(&bytes, ArchiveKind::Tar);
    let report = result.unwrap();

    assert_eq!(report.item_count, 0);
    assert_eq!(report.total_price, 0.0);
    assert!(sink.rows.is_empty());
}

#[test]
fn test_header_only_and_empty_members() {
    let bytes = zip_archive(&[("header.csv", &csv_file(&[])), ("empty.csv", "")]);
    let (result, _) = ingest(&bytes, ArchiveKind::Zip);
    let report = result.unwrap();

    assert_eq!(report.item_count, 0);
    assert_eq!(report.rejections.len(), 1);
    assert_eq!(report.rejections[0].member, "empty.csv");
    assert_eq!(report.rejections[0].reason, RejectReason::MissingHeader);
}

#[test]
fn test_tar_bytes_declared_as_zip_fail() {
    let bytes = tar_archive(&[("prices.csv", &sample_csv())]);
    let (result, sink) = ingest(&bytes, ArchiveKind::Zip);

    let err = result.unwrap_err();
    assert!(matches!(err, IngestError::Zip(_)));
    assert!(err.is_archive_error());
    assert!(sink.rows.is_empty());
}

#[test]
fn test_missing_archive_file() {
    let mut sink = VecSink::default();
    let result = run_archive(
        std::path::Path::new("/nonexistent/prices.zip"),
        ArchiveKind::Zip,
        &mut sink,
    );

    let err = result.unwrap_err();
    assert!(matches!(err, IngestError::Open(_)));
    assert!(!err.is_archive_error());
}
