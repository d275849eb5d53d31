use thiserror::Error;

/// Fatal ingestion failures
///
/// Any of these aborts the pass and rolls the transaction back. Recoverable
/// row problems are not errors; see [`RejectReason`](super::RejectReason).
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to open archive: {0}")]
    Open(#[source] std::io::Error),

    #[error("Malformed zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed tar archive: {0}")]
    Tar(#[source] std::io::Error),

    #[error("Failed to read archive member '{member}': {source}")]
    Member {
        member: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to store row {row} of '{member}': {source}")]
    Persistence {
        member: String,
        row: u64,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to begin transaction: {0}")]
    Begin(#[source] sqlx::Error),

    #[error("Failed to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("Ingestion worker failed: {0}")]
    Worker(String),
}

impl IngestError {
    /// True when the uploaded archive itself is at fault
    pub fn is_archive_error(&self) -> bool {
        matches!(
            self,
            IngestError::Zip(_) | IngestError::Tar(_) | IngestError::Member { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_error_classification() {
        let tar = IngestError::Tar(std::io::Error::other("bad header"));
        assert!(tar.is_archive_error());

        let member = IngestError::Member {
            member: "a.csv".to_string(),
            source: std::io::Error::other("crc mismatch"),
        };
        assert!(member.is_archive_error());
        assert!(member.to_string().contains("a.csv"));

        let commit = IngestError::Commit(sqlx::Error::PoolClosed);
        assert!(!commit.is_archive_error());
    }
}
