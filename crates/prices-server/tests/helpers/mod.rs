//! Test helpers for prices server integration tests
//!
//! - Archive builders for zip and tar fixtures
//! - Multipart request bodies
//! - A router wired with test configuration

#![allow(dead_code)]

use axum::Router;
use prices_server::config::Config;
use sqlx::PgPool;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub const CSV_HEADER: &str = "id,name,category,price,create_date";

pub const BOUNDARY: &str = "prices-test-boundary";

/// CSV text with the standard header followed by `rows`
pub fn csv_file(rows: &[&str]) -> String {
    let mut out = format!("{}\n", CSV_HEADER);
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}

/// The three-row sample: two good Tools rows and one short row
pub fn sample_csv() -> String {
    csv_file(&[
        "1,Widget,Tools,9.99,2023-01-01",
        "2,Gadget,Tools,19.50,2023-01-02",
        "3,Bad,Row",
    ])
}

pub fn zip_archive(members: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in members {
        zip.start_file(*name, SimpleFileOptions::default())
            .expect("start zip member");
        zip.write_all(content.as_bytes()).expect("write zip member");
    }
    zip.finish().expect("finish zip").into_inner()
}

pub fn tar_archive(members: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, name, content.as_bytes())
            .expect("append tar member");
    }
    builder.into_inner().expect("finish tar")
}

/// Write `bytes` to a temp file that lives as long as the returned handle
pub fn spool(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(bytes).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// A single-field `multipart/form-data` body
pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    write!(
        body,
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .expect("write multipart head");
    body.extend_from_slice(bytes);
    write!(body, "\r\n--{BOUNDARY}--\r\n").expect("write multipart tail");
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.upload_limit_bytes = 1024 * 1024;
    config
}

pub fn test_app(pool: PgPool) -> Router {
    prices_server::api::create_router(pool, &test_config())
}

pub async fn count_prices(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM prices")
        .fetch_one(pool)
        .await
        .expect("count prices")
}
