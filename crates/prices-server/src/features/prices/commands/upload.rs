use crate::ingest::{self, IngestError, IngestionReport};
use prices_common::ArchiveKind;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::path::PathBuf;

/// Ingest an archive that has already been spooled to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPricesCommand {
    pub archive_kind: ArchiveKind,
    pub archive_path: PathBuf,
    /// Bytes received for the `file` field
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPricesResponse {
    pub total_items: u64,
    pub total_categories: usize,
    pub total_price: f64,
}

impl From<&IngestionReport> for UploadPricesResponse {
    fn from(report: &IngestionReport) -> Self {
        Self {
            total_items: report.item_count,
            total_categories: report.category_count(),
            total_price: report.total_price,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadPricesError {
    #[error("Multipart field 'file' is required")]
    FileRequired,
    #[error("Content is required and cannot be empty")]
    ContentRequired,
    #[error("Unsupported archive type '{0}', expected 'zip' or 'tar'")]
    UnsupportedArchive(String),
    #[error("Failed to read multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("Failed to spool upload: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Resolve the `type` query parameter; absent or blank means zip
pub fn parse_archive_kind(raw: Option<&str>) -> Result<ArchiveKind, UploadPricesError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(ArchiveKind::default()),
        Some(value) => value
            .parse()
            .map_err(|_| UploadPricesError::UnsupportedArchive(value.to_string())),
    }
}

impl UploadPricesCommand {
    pub fn validate(&self) -> Result<(), UploadPricesError> {
        if self.size == 0 {
            return Err(UploadPricesError::ContentRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool), fields(kind = %command.archive_kind, size = command.size))]
pub async fn handle(
    pool: PgPool,
    command: UploadPricesCommand,
) -> Result<UploadPricesResponse, UploadPricesError> {
    command.validate()?;

    let report =
        ingest::ingest_archive(&pool, command.archive_path, command.archive_kind).await?;

    if report.skipped() > 0 {
        tracing::info!(skipped = report.skipped(), "Upload contained rejected records");
    }

    Ok(UploadPricesResponse::from(&report))
}
