use crate::api::response::ErrorResponse;
use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use prices_common::ArchiveKind;
use serde::Deserialize;
use sqlx::PgPool;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use super::{
    commands::{parse_archive_kind, UploadPricesCommand, UploadPricesError},
    queries::{ExportPricesError, ExportPricesQuery},
};

/// Multipart field carrying the archive
pub const FILE_FIELD: &str = "file";

pub fn prices_routes() -> Router<PgPool> {
    Router::new().route("/", post(upload_prices).get(export_prices))
}

#[derive(Debug, Default, Deserialize)]
struct UploadParams {
    #[serde(rename = "type")]
    archive_type: Option<String>,
}

#[tracing::instrument(skip(pool, multipart), fields(archive_type = ?params.archive_type))]
async fn upload_prices(
    State(pool): State<PgPool>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Response, PricesApiError> {
    let archive_kind = parse_archive_kind(params.archive_type.as_deref())?;

    let (spooled, size) = spool_file_field(&mut multipart, archive_kind).await?;

    let command = UploadPricesCommand {
        archive_kind,
        archive_path: spooled.path().to_path_buf(),
        size,
    };

    let response = super::commands::upload::handle(pool, command).await?;

    tracing::info!(
        total_items = response.total_items,
        total_categories = response.total_categories,
        total_price = response.total_price,
        "Prices uploaded via API"
    );

    // Removes the temp file.
    drop(spooled);

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Stream the `file` field into a fresh temp file, returning it with its size
///
/// Other fields are skipped. Each request gets its own file, so concurrent
/// uploads never share a path.
async fn spool_file_field(
    multipart: &mut Multipart,
    kind: ArchiveKind,
) -> Result<(NamedTempFile, u64), UploadPricesError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let spooled = tempfile::Builder::new()
            .prefix("prices-upload-")
            .suffix(&format!(".{}", kind.extension()))
            .tempfile()?;
        let mut out = tokio::fs::File::from_std(spooled.as_file().try_clone()?);

        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await? {
            out.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        out.flush().await?;

        tracing::debug!(path = %spooled.path().display(), size, "Upload spooled");
        return Ok((spooled, size));
    }

    Err(UploadPricesError::FileRequired)
}

#[tracing::instrument(skip(pool))]
async fn export_prices(State(pool): State<PgPool>) -> Result<Response, PricesApiError> {
    let response = super::queries::export::handle(pool, ExportPricesQuery::default()).await?;

    tracing::info!(
        rows = response.row_count,
        size = response.bytes.len(),
        "Prices exported via API"
    );

    let disposition = format!("attachment; filename={}", response.filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        response.bytes,
    )
        .into_response())
}

#[derive(Debug)]
enum PricesApiError {
    UploadError(UploadPricesError),
    ExportError(ExportPricesError),
}

impl From<UploadPricesError> for PricesApiError {
    fn from(err: UploadPricesError) -> Self {
        Self::UploadError(err)
    }
}

impl From<ExportPricesError> for PricesApiError {
    fn from(err: ExportPricesError) -> Self {
        Self::ExportError(err)
    }
}

impl IntoResponse for PricesApiError {
    fn into_response(self) -> Response {
        match self {
            PricesApiError::UploadError(UploadPricesError::FileRequired)
            | PricesApiError::UploadError(UploadPricesError::ContentRequired) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            PricesApiError::UploadError(UploadPricesError::Multipart(ref e)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (e.status(), Json(error)).into_response()
            },
            PricesApiError::UploadError(UploadPricesError::UnsupportedArchive(_)) => {
                let error = ErrorResponse::new("UNSUPPORTED_ARCHIVE", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            PricesApiError::UploadError(UploadPricesError::Ingest(ref e))
                if e.is_archive_error() =>
            {
                tracing::warn!("Rejected archive: {}", e);
                let error = ErrorResponse::new("ARCHIVE_ERROR", self.to_string());
                (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response()
            },
            PricesApiError::UploadError(UploadPricesError::Ingest(_))
            | PricesApiError::UploadError(UploadPricesError::Io(_)) => {
                tracing::error!("Ingestion failed: {}", self);
                let error = ErrorResponse::new("INGEST_ERROR", "Failed to ingest archive");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            PricesApiError::ExportError(_) => {
                tracing::error!("Export failed: {}", self);
                let error = ErrorResponse::new("EXPORT_ERROR", "Failed to export prices");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for PricesApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UploadError(e) => write!(f, "{}", e),
            Self::ExportError(e) => write!(f, "{}", e),
        }
    }
}
