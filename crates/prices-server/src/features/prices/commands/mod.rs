pub mod upload;

pub use upload::{parse_archive_kind, UploadPricesCommand, UploadPricesError, UploadPricesResponse};
