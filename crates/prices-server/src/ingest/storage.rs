// Transactional sink for validated price records
//
// The pipeline itself is synchronous (archive and CSV readers are blocking
// `Read`s), so the PostgreSQL sink runs on a blocking worker and drives its
// transaction through the runtime handle it was created on.

use prices_common::PriceRecord;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::runtime::Handle;
use tracing::debug;

use super::error::IngestError;

pub const INSERT_PRICE_SQL: &str =
    "INSERT INTO prices (name, category, price, create_date) VALUES ($1, $2, $3, $4::date)";

/// Destination for accepted records
pub trait RecordSink {
    fn insert(&mut self, record: &PriceRecord) -> Result<(), sqlx::Error>;
}

/// A sink whose writes only become visible on commit
pub trait TransactionalSink: RecordSink {
    fn commit(self) -> Result<(), sqlx::Error>;
    fn rollback(self) -> Result<(), sqlx::Error>;
}

/// One PostgreSQL transaction shared by every insert of a pass
///
/// Must be used from a blocking context (`spawn_blocking`), never from inside
/// an async task. Dropping it without finalizing rolls the transaction back.
pub struct PgTransactionSink {
    tx: Transaction<'static, Postgres>,
    runtime: Handle,
    inserted: u64,
}

impl PgTransactionSink {
    /// Open the transaction on the current runtime
    pub async fn begin(pool: &PgPool) -> Result<Self, IngestError> {
        let tx = pool.begin().await.map_err(IngestError::Begin)?;
        Ok(Self {
            tx,
            runtime: Handle::current(),
            inserted: 0,
        })
    }

    pub fn inserted(&self) -> u64 {
        self.inserted
    }
}

impl RecordSink for PgTransactionSink {
    fn insert(&mut self, record: &PriceRecord) -> Result<(), sqlx::Error> {
        let query = sqlx::query(INSERT_PRICE_SQL)
            .bind(&record.name)
            .bind(&record.category)
            .bind(record.price)
            .bind(&record.create_date);

        self.runtime.block_on(query.execute(&mut *self.tx))?;
        self.inserted += 1;
        Ok(())
    }
}

impl TransactionalSink for PgTransactionSink {
    fn commit(self) -> Result<(), sqlx::Error> {
        debug!(rows = self.inserted, "Committing price transaction");
        self.runtime.block_on(self.tx.commit())
    }

    fn rollback(self) -> Result<(), sqlx::Error> {
        debug!(rows = self.inserted, "Rolling back price transaction");
        self.runtime.block_on(self.tx.rollback())
    }
}
