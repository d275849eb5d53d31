pub mod export;

pub use export::{
    zip_single_file, ExportPricesError, ExportPricesQuery, ExportPricesResponse, StoredPrice,
};
