//! Ingestion tests against PostgreSQL
//!
//! Uses `#[sqlx::test]`, so every test gets a fresh database with the
//! workspace migrations applied. Requires `DATABASE_URL`.
//!
//! Coverage includes:
//! - Commit of accepted rows
//! - Rollback when a row cannot be stored
//! - Repeated uploads append

use prices_common::ArchiveKind;
use prices_server::ingest::{ingest_archive, IngestError};
use sqlx::PgPool;

mod helpers;
use helpers::*;

#[sqlx::test(migrations = "../../migrations")]
async fn test_ingest_commits_accepted_rows(pool: PgPool) -> sqlx::Result<()> {
    let file = spool(&zip_archive(&[("prices.csv", &sample_csv())]));

    let report = ingest_archive(&pool, file.path().to_path_buf(), ArchiveKind::Zip)
        .await
        .unwrap();

    assert_eq!(report.item_count, 2);
    assert_eq!(count_prices(&pool).await, 2);

    let rows: Vec<(String, String, f64, chrono::NaiveDate)> =
        sqlx::query_as("SELECT name, category, price, create_date FROM prices ORDER BY id")
            .fetch_all(&pool)
            .await?;
    assert_eq!(rows[0].0, "Widget");
    assert_eq!(rows[0].1, "Tools");
    assert_eq!(rows[1].2, 19.5);
    assert_eq!(rows[1].3, chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unstorable_date_rolls_back_everything(pool: PgPool) -> sqlx::Result<()> {
    let good = csv_file(&["1,Widget,Tools,9.99,2023-01-01"]);
    let bad = csv_file(&["2,Gadget,Tools,19.50,not-a-date"]);
    let file = spool(&tar_archive(&[("a.csv", &good), ("b.csv", &bad)]));

    let err = ingest_archive(&pool, file.path().to_path_buf(), ArchiveKind::Tar)
        .await
        .unwrap_err();

    match err {
        IngestError::Persistence { member, row, .. } => {
            assert_eq!(member, "b.csv");
            assert_eq!(row, 2);
        },
        other => panic!("expected persistence error, got {other:?}"),
    }
    assert_eq!(count_prices(&pool).await, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_malformed_archive_leaves_table_untouched(pool: PgPool) -> sqlx::Result<()> {
    let file = spool(b"this is not a zip file");

    let err = ingest_archive(&pool, file.path().to_path_buf(), ArchiveKind::Zip)
        .await
        .unwrap_err();

    assert!(err.is_archive_error());
    assert_eq!(count_prices(&pool).await, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_repeated_upload_appends(pool: PgPool) -> sqlx::Result<()> {
    let file = spool(&zip_archive(&[("prices.csv", &sample_csv())]));

    for _ in 0..2 {
        ingest_archive(&pool, file.path().to_path_buf(), ArchiveKind::Zip)
            .await
            .unwrap();
    }

    assert_eq!(count_prices(&pool).await, 4);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_concurrent_uploads_are_isolated(pool: PgPool) -> sqlx::Result<()> {
    let good = spool(&zip_archive(&[("prices.csv", &sample_csv())]));
    let bad = spool(&zip_archive(&[(
        "prices.csv",
        &csv_file(&["1,Widget,Tools,9.99,2023-01-01", "2,Broken,Tools,1.00,31/31/2023"]),
    )]));

    let (ok, failed) = tokio::join!(
        ingest_archive(&pool, good.path().to_path_buf(), ArchiveKind::Zip),
        ingest_archive(&pool, bad.path().to_path_buf(), ArchiveKind::Zip),
    );

    assert_eq!(ok.unwrap().item_count, 2);
    assert!(failed.is_err());
    assert_eq!(count_prices(&pool).await, 2);

    Ok(())
}
