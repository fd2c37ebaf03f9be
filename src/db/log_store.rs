use sqlx::SqlitePool;

use crate::models::LogRecord;

/// Persistent cache of log records plus the set of ids whose detail was
/// explicitly fetched. Every operation is individually atomic; concurrent
/// writes to the same id serialize through sqlite, last completed write wins.
#[derive(Clone)]
pub struct LogStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct LogRow {
    id: i64,
    date: String,
    amount: f64,
    kind: String,
    category: String,
    description: String,
}

impl From<LogRow> for LogRecord {
    fn from(row: LogRow) -> Self {
        LogRecord {
            id: row.id,
            date: row.date,
            amount: row.amount,
            kind: row.kind,
            category: row.category,
            description: row.description,
        }
    }
}

impl LogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert-or-replace by id. Whole-record, never a partial field update.
    pub async fn upsert(&self, record: &LogRecord) -> Result<(), sqlx::Error> {
        tracing::debug!(id = record.id, "upserting log");
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO logs (id, date, amount, kind, category, description)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id)
        .bind(&record.date)
        .bind(record.amount)
        .bind(&record.kind)
        .bind(&record.category)
        .bind(&record.description)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_all(&self) -> Result<Vec<LogRecord>, sqlx::Error> {
        let rows: Vec<LogRow> = sqlx::query_as("SELECT * FROM logs ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(LogRecord::from).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<LogRecord>, sqlx::Error> {
        let row: Option<LogRow> = sqlx::query_as("SELECT * FROM logs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(LogRecord::from))
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<(), sqlx::Error> {
        tracing::debug!(id, "deleting log");
        sqlx::query("DELETE FROM logs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record that the full detail for `id` was confirmed from the server.
    /// Markers are never removed.
    pub async fn mark_fetched(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR REPLACE INTO fetched (id) VALUES (?)")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn is_fetched(&self, id: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM fetched WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
