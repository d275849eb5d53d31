//! Domain types shared between the server and its tests

use serde::{Deserialize, Serialize};

use crate::error::PricesError;

/// Container format of an uploaded archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    #[default]
    Zip,
    Tar,
}

impl ArchiveKind {
    /// File extension used when spooling an upload of this kind to disk
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Tar => "tar",
        }
    }
}

impl std::str::FromStr for ArchiveKind {
    type Err = PricesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zip" => Ok(ArchiveKind::Zip),
            "tar" => Ok(ArchiveKind::Tar),
            _ => Err(PricesError::UnsupportedArchive(s.to_string())),
        }
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// A validated price row, ready to be persisted
///
/// `create_date` is kept as the raw text from the upload; the store is
/// responsible for coercing it to a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub create_date: String,
}
