use async_trait::async_trait;
use chrono::Utc;
use powerblockade_application::ports::ManualEntryRepository;
use powerblockade_domain::{DomainError, ListType, ManualEntry};
use sqlx::{Row, SqlitePool};
use tracing::instrument;

pub struct SqliteManualEntryRepository {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

impl SqliteManualEntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> ManualEntry {
        ManualEntry {
            id: Some(row.get("id")),
            domain: row.get("domain"),
            entry_type: ListType::parse(&row.get::<String, _>("entry_type"))
                .unwrap_or(ListType::Block),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl ManualEntryRepository for SqliteManualEntryRepository {
    #[instrument(skip(self, entry), fields(domain = %entry.domain))]
    async fn create(&self, entry: ManualEntry) -> Result<ManualEntry, DomainError> {
        let domain = entry.domain.trim().to_ascii_lowercase();
        let domain = domain.trim_end_matches('.');

        let result = sqlx::query(
            "INSERT INTO manual_entries (domain, entry_type, created_at) VALUES (?, ?, ?)",
        )
        .bind(domain)
        .bind(entry.entry_type.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                DomainError::Conflict(format!("Manual entry '{domain}' already exists"))
            } else {
                db_err(e)
            }
        })?;

        let row = sqlx::query("SELECT id, domain, entry_type, created_at FROM manual_entries WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(Self::row_to_entry(&row))
    }

    async fn get_all(&self) -> Result<Vec<ManualEntry>, DomainError> {
        let rows = sqlx::query("SELECT id, domain, entry_type, created_at FROM manual_entries")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(Self::row_to_entry).collect())
    }

    async fn get_by_domain(&self, domain: &str) -> Result<Option<ManualEntry>, DomainError> {
        let row = sqlx::query(
            "SELECT id, domain, entry_type, created_at FROM manual_entries
             WHERE lower(domain) = lower(?)",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.as_ref().map(Self::row_to_entry))
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM manual_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("manual entry {id}")));
        }
        Ok(())
    }
}
