use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::types::Result;

/// Persistent set of filing identifiers that have been fully processed.
///
/// Backed by a single-table SQLite database so the set survives restarts.
/// Entries are only ever inserted; the feed is a sliding window of recent
/// filings, so the table grows slowly and is never expired.
pub struct ProcessedLedger {
    db: SqlitePool,
}

impl ProcessedLedger {
    /// Open (or create) the ledger database at the given path and ensure the
    /// schema exists. Safe to call repeatedly against the same file.
    pub async fn open(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let db = SqlitePoolOptions::new().connect_with(options).await?;
        let ledger = Self { db };
        ledger.ensure_schema().await?;

        info!("Opened processed-filings ledger at {}", path);
        Ok(ledger)
    }

    /// In-memory ledger for tests. A single connection keeps every query on
    /// the same ephemeral database.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(":memory:");
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let ledger = Self { db };
        ledger.ensure_schema().await?;
        Ok(ledger)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS processed_filings (
                id TEXT PRIMARY KEY
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Whether a filing identifier has already been processed.
    ///
    /// Errors are propagated so the caller can log a storage failure
    /// distinctly from a true "not seen" result.
    pub async fn contains(&self, id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM processed_filings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }

    /// Record a filing identifier as processed. Re-recording an existing id
    /// is a no-op, not an error.
    pub async fn record(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO processed_filings (id) VALUES (?) ON CONFLICT(id) DO NOTHING",
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            debug!(filing_id = id, "filing id already recorded");
        }

        Ok(())
    }

    /// Number of recorded filings, for startup logging.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM processed_filings")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }
}
