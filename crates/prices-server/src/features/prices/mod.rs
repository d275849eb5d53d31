pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{UploadPricesCommand, UploadPricesError, UploadPricesResponse};

pub use queries::{ExportPricesError, ExportPricesQuery, ExportPricesResponse, StoredPrice};

pub use routes::prices_routes;
