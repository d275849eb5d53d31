//! Ingestion pipeline
//!
//! One pass reads every CSV member of an archive, validates each row and
//! writes accepted rows through a [`RecordSink`]. The pass is sequential:
//! members in archive order, rows in file order.
//!
//! [`finalize`] is the single exit point that decides the fate of the
//! transaction: commit after a clean pass, rollback after an error, and
//! rollback followed by re-raising after a panic.

use std::fs::File;
use std::io::BufReader;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use prices_common::ArchiveKind;
use sqlx::PgPool;
use tracing::{debug, error, info};

use super::archive::{is_csv_member, ArchiveMember, MemberSource, TarMembers, ZipMembers};
use super::error::IngestError;
use super::models::IngestionReport;
use super::records::RecordReader;
use super::storage::{PgTransactionSink, RecordSink, TransactionalSink};
use super::validator::{validate_row, RejectReason};

/// Ingest an archive file into the `prices` table
///
/// Opens the transaction first, then runs the pass on a blocking worker.
/// Either every accepted row is committed or none is.
#[tracing::instrument(skip(pool, path), fields(path = %path.display()))]
pub async fn ingest_archive(
    pool: &PgPool,
    path: PathBuf,
    kind: ArchiveKind,
) -> Result<IngestionReport, IngestError> {
    let sink = PgTransactionSink::begin(pool).await?;

    let report = tokio::task::spawn_blocking(move || {
        finalize(sink, |sink| run_archive(&path, kind, sink))
    })
    .await
    .map_err(|e| {
        if e.is_panic() {
            IngestError::Worker("ingestion worker panicked".to_string())
        } else {
            IngestError::Worker(e.to_string())
        }
    })??;

    info!(
        items = report.item_count,
        categories = report.category_count(),
        total_price = report.total_price,
        skipped = report.skipped(),
        "Archive ingested"
    );

    Ok(report)
}

/// Run `pass` against `sink` and commit or roll back based on its outcome
///
/// A panic inside `pass` rolls back before the panic continues to unwind.
pub fn finalize<S, F>(mut sink: S, pass: F) -> Result<IngestionReport, IngestError>
where
    S: TransactionalSink,
    F: FnOnce(&mut S) -> Result<IngestionReport, IngestError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| pass(&mut sink))) {
        Ok(Ok(report)) => {
            sink.commit().map_err(IngestError::Commit)?;
            Ok(report)
        },
        Ok(Err(err)) => {
            error!(error = %err, "Ingestion failed, rolling back");
            if let Err(rollback_err) = sink.rollback() {
                error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        },
        Err(payload) => {
            error!("Ingestion panicked, rolling back");
            if let Err(rollback_err) = sink.rollback() {
                error!(error = %rollback_err, "Rollback failed");
            }
            panic::resume_unwind(payload)
        },
    }
}

/// Open the archive at `path` and run one pass over it
pub fn run_archive<S>(
    path: &Path,
    kind: ArchiveKind,
    sink: &mut S,
) -> Result<IngestionReport, IngestError>
where
    S: RecordSink + ?Sized,
{
    let file = BufReader::new(File::open(path).map_err(IngestError::Open)?);
    debug!(%kind, "Opened archive");

    match kind {
        ArchiveKind::Zip => {
            let mut members = ZipMembers::new(file)?;
            run_members(&mut members, sink)
        },
        ArchiveKind::Tar => {
            let mut archive = tar::Archive::new(file);
            let mut members = TarMembers::new(&mut archive)?;
            run_members(&mut members, sink)
        },
    }
}

/// Drain a member source into the sink
pub fn run_members<M, S>(members: &mut M, sink: &mut S) -> Result<IngestionReport, IngestError>
where
    M: MemberSource + ?Sized,
    S: RecordSink + ?Sized,
{
    let mut report = IngestionReport::default();

    while let Some(member) = members.next_member()? {
        if !is_csv_member(&member.name) {
            debug!(member = %member.name, "Ignoring non-CSV member");
            continue;
        }
        ingest_member(member, sink, &mut report)?;
    }

    Ok(report)
}

fn ingest_member<S>(
    member: ArchiveMember<'_>,
    sink: &mut S,
    report: &mut IngestionReport,
) -> Result<(), IngestError>
where
    S: RecordSink + ?Sized,
{
    let ArchiveMember { name, content } = member;
    debug!(member = %name, "Reading CSV member");

    let mut reader = RecordReader::new(content);
    let mut record = StringRecord::new();

    // Header row is always discarded; without one the member is skipped.
    match read_next(&mut reader, &mut record, &name)? {
        Some(Ok(())) => {},
        Some(Err(reason)) => {
            report.reject(&name, 1, reason);
            return Ok(());
        },
        None => {
            report.reject(&name, 1, RejectReason::MissingHeader);
            return Ok(());
        },
    }

    let mut row = 1u64;
    loop {
        row += 1;
        match read_next(&mut reader, &mut record, &name)? {
            None => break,
            Some(Err(reason)) => {
                report.reject(&name, row, reason);
                continue;
            },
            Some(Ok(())) => {},
        }

        let price = match validate_row(&record) {
            Ok(price) => price,
            Err(reason) => {
                report.reject(&name, row, reason);
                continue;
            },
        };

        sink.insert(&price)
            .map_err(|source| IngestError::Persistence {
                member: name.clone(),
                row,
                source,
            })?;
        report.accept(&price);
    }

    Ok(())
}

/// Read one record, turning stream failures into a member error
fn read_next<R: std::io::Read>(
    reader: &mut RecordReader<R>,
    record: &mut StringRecord,
    member: &str,
) -> Result<Option<Result<(), RejectReason>>, IngestError> {
    reader.read(record).map_err(|source| IngestError::Member {
        member: member.to_string(),
        source,
    })
}
