use chrono::NaiveDate;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::io::{Cursor, Write};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

pub const EXPORT_SQL: &str =
    "SELECT id, name, category, price, create_date FROM prices ORDER BY id";

pub const EXPORT_HEADER: [&str; 5] = ["id", "name", "category", "price", "create_date"];

/// Name of the CSV member inside the exported archive
pub const EXPORT_MEMBER: &str = "data.csv";

/// Name offered to the client for the archive itself
pub const EXPORT_FILENAME: &str = "data.zip";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportPricesQuery {}

#[derive(Debug, Clone)]
pub struct ExportPricesResponse {
    pub filename: String,
    pub row_count: u64,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredPrice {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub create_date: NaiveDate,
}

impl StoredPrice {
    /// CSV fields in export column order
    pub fn to_record(&self) -> [String; 5] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            format!("{:.2}", self.price),
            self.create_date.format("%Y-%m-%d").to_string(),
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportPricesError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wrap `content` as the only member of a deflated zip archive
pub fn zip_single_file(name: &str, content: &[u8]) -> Result<Vec<u8>, zip::result::ZipError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(name, options)?;
    zip.write_all(content)?;
    Ok(zip.finish()?.into_inner())
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    _query: ExportPricesQuery,
) -> Result<ExportPricesResponse, ExportPricesError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    let mut row_count = 0u64;
    let mut rows = sqlx::query_as::<_, StoredPrice>(EXPORT_SQL).fetch(&pool);
    while let Some(row) = rows.try_next().await? {
        writer.write_record(row.to_record())?;
        row_count += 1;
    }

    let csv_bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let bytes = zip_single_file(EXPORT_MEMBER, &csv_bytes)?;

    tracing::debug!(rows = row_count, size = bytes.len(), "Export archive built");

    Ok(ExportPricesResponse {
        filename: EXPORT_FILENAME.to_string(),
        row_count,
        bytes,
    })
}
