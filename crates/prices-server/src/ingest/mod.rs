//! Archive ingestion
//!
//! Turns an uploaded zip or tar archive into rows of the `prices` table.
//!
//! # Flow
//!
//! ```text
//! temp file ──> MemberSource (zip | tar) ──> RecordReader ──> validate_row
//!                                                              │
//!                                    IngestionReport <─────────┼──> RecordSink (one transaction)
//! ```
//!
//! - [`archive`]: one iteration contract over both container formats
//! - [`records`]: strict CSV tokenizing (quoting, UTF-8)
//! - [`validator`]: raw CSV row to [`PriceRecord`](prices_common::PriceRecord)
//! - [`pipeline`]: drives a pass and decides commit vs. rollback
//! - [`storage`]: the transactional sink backed by PostgreSQL
//!
//! A pass is all-or-nothing. Bad rows are skipped and reported in
//! [`IngestionReport::rejections`]; archive and store failures abort the pass
//! and roll the transaction back.

pub mod archive;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod records;
pub mod storage;
pub mod validator;

pub use archive::{is_csv_member, ArchiveMember, MemberSource, TarMembers, ZipMembers};
pub use error::IngestError;
pub use models::{IngestionReport, RowRejection};
pub use pipeline::{finalize, ingest_archive, run_archive, run_members};
pub use records::RecordReader;
pub use storage::{PgTransactionSink, RecordSink, TransactionalSink};
pub use validator::{validate_row, RejectReason};
