//! Row validation
//!
//! Input rows are `[external_id, name, category, price, create_date]`. The
//! external id is read but never stored. Checks are deliberately lax: the
//! price only has to parse as `f64`, and the date is left for the store to
//! coerce.

use csv::StringRecord;
use prices_common::PriceRecord;
use thiserror::Error;

/// Minimum number of columns in an accepted row.
pub const MIN_FIELDS: usize = 5;

const NAME: usize = 1;
const CATEGORY: usize = 2;
const PRICE: usize = 3;
const CREATE_DATE: usize = 4;

/// Why a row (or a whole member) was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("malformed row: expected at least 5 fields, found {0}")]
    MalformedRow(usize),

    #[error("invalid price '{0}'")]
    InvalidPrice(String),

    #[error("unparseable CSV: {0}")]
    Unparseable(String),

    #[error("missing header row")]
    MissingHeader,
}

/// Validate one tokenized data row
pub fn validate_row(row: &StringRecord) -> Result<PriceRecord, RejectReason> {
    if row.len() < MIN_FIELDS {
        return Err(RejectReason::MalformedRow(row.len()));
    }

    let raw_price = &row[PRICE];
    let price: f64 = raw_price
        .parse()
        .map_err(|_| RejectReason::InvalidPrice(raw_price.to_string()))?;

    Ok(PriceRecord {
        name: row[NAME].to_string(),
        category: row[CATEGORY].to_string(),
        price,
        create_date: row[CREATE_DATE].to_string(),
    })
}
