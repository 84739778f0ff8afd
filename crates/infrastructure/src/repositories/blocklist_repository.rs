use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_application::ports::BlocklistRepository;
use powerblockade_domain::{Blocklist, BlocklistFormat, DomainError, DomainSearchHit, ListType};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeSet;
use tracing::{error, instrument};

pub struct SqliteBlocklistRepository {
    pool: SqlitePool,
}

const BLOCKLIST_COLUMNS: &str = "id, name, url, format, list_type, enabled, \
    update_frequency_hours, last_updated, last_update_status, last_error, entry_count, \
    etag, last_modified, schedule_enabled, schedule_start, schedule_end, schedule_days, created_at";

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

impl SqliteBlocklistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_blocklist(row: &sqlx::sqlite::SqliteRow) -> Blocklist {
        Blocklist {
            id: Some(row.get("id")),
            name: row.get("name"),
            url: row.get("url"),
            format: BlocklistFormat::parse(&row.get::<String, _>("format"))
                .unwrap_or(BlocklistFormat::Domains),
            list_type: ListType::parse(&row.get::<String, _>("list_type"))
                .unwrap_or(ListType::Block),
            enabled: row.get("enabled"),
            update_frequency_hours: row.get("update_frequency_hours"),
            last_updated: row.get("last_updated"),
            last_update_status: row.get("last_update_status"),
            last_error: row.get("last_error"),
            entry_count: row.get("entry_count"),
            etag: row.get("etag"),
            last_modified: row.get("last_modified"),
            schedule_enabled: row.get("schedule_enabled"),
            schedule_start: row.get("schedule_start"),
            schedule_end: row.get("schedule_end"),
            schedule_days: row.get("schedule_days"),
            created_at: row.get("created_at"),
        }
    }

    async fn fetch_where(&self, clause: &str) -> Result<Vec<Blocklist>, DomainError> {
        let sql = format!("SELECT {BLOCKLIST_COLUMNS} FROM blocklists {clause}");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(Self::row_to_blocklist).collect())
    }
}

#[async_trait]
impl BlocklistRepository for SqliteBlocklistRepository {
    #[instrument(skip(self, blocklist), fields(name = %blocklist.name))]
    async fn create(&self, blocklist: Blocklist) -> Result<Blocklist, DomainError> {
        let result = sqlx::query(
            "INSERT INTO blocklists
                (name, url, format, list_type, enabled, update_frequency_hours,
                 last_updated, last_update_status, last_error, entry_count, etag, last_modified,
                 schedule_enabled, schedule_start, schedule_end, schedule_days, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&blocklist.name)
        .bind(&blocklist.url)
        .bind(blocklist.format.as_str())
        .bind(blocklist.list_type.as_str())
        .bind(blocklist.enabled)
        .bind(blocklist.update_frequency_hours)
        .bind(blocklist.last_updated)
        .bind(&blocklist.last_update_status)
        .bind(&blocklist.last_error)
        .bind(blocklist.entry_count)
        .bind(&blocklist.etag)
        .bind(&blocklist.last_modified)
        .bind(blocklist.schedule_enabled)
        .bind(&blocklist.schedule_start)
        .bind(&blocklist.schedule_end)
        .bind(&blocklist.schedule_days)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                DomainError::Conflict(format!("Blocklist URL '{}' already exists", blocklist.url))
            } else {
                error!(error = %e, "Failed to create blocklist");
                db_err(e)
            }
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id).await?.ok_or_else(|| {
            DomainError::DatabaseError("Failed to fetch created blocklist".to_string())
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Blocklist>, DomainError> {
        let sql = format!("SELECT {BLOCKLIST_COLUMNS} FROM blocklists WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(Self::row_to_blocklist))
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Blocklist>, DomainError> {
        let sql = format!("SELECT {BLOCKLIST_COLUMNS} FROM blocklists WHERE url = ?");
        let row = sqlx::query(&sql)
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(Self::row_to_blocklist))
    }

    async fn get_all(&self) -> Result<Vec<Blocklist>, DomainError> {
        self.fetch_where("ORDER BY created_at DESC").await
    }

    async fn get_enabled(&self) -> Result<Vec<Blocklist>, DomainError> {
        self.fetch_where("WHERE enabled = 1 ORDER BY created_at DESC")
            .await
    }

    async fn get_scheduled(&self) -> Result<Vec<Blocklist>, DomainError> {
        self.fetch_where("WHERE schedule_enabled = 1").await
    }

    async fn update(&self, blocklist: &Blocklist) -> Result<(), DomainError> {
        let Some(id) = blocklist.id else {
            return Err(DomainError::Validation("Blocklist has no id".to_string()));
        };
        sqlx::query(
            "UPDATE blocklists SET
                name = ?, url = ?, format = ?, list_type = ?, enabled = ?,
                update_frequency_hours = ?, schedule_enabled = ?, schedule_start = ?,
                schedule_end = ?, schedule_days = ?
             WHERE id = ?",
        )
        .bind(&blocklist.name)
        .bind(&blocklist.url)
        .bind(blocklist.format.as_str())
        .bind(blocklist.list_type.as_str())
        .bind(blocklist.enabled)
        .bind(blocklist.update_frequency_hours)
        .bind(blocklist.schedule_enabled)
        .bind(&blocklist.schedule_start)
        .bind(&blocklist.schedule_end)
        .bind(&blocklist.schedule_days)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn set_enabled(&self, id: i64, enabled: bool) -> Result<(), DomainError> {
        sqlx::query("UPDATE blocklists SET enabled = ? WHERE id = ?")
            .bind(enabled)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM blocklists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("blocklist {id}")));
        }
        Ok(())
    }

    async fn record_fetch_success(
        &self,
        id: i64,
        entry_count: i64,
        etag: Option<&str>,
        last_modified: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE blocklists SET last_update_status = 'success', last_error = NULL,
                    entry_count = ?, etag = ?, last_modified = ?, last_updated = ?
             WHERE id = ?",
        )
        .bind(entry_count)
        .bind(etag)
        .bind(last_modified)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn record_fetch_not_modified(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE blocklists SET last_update_status = 'success', last_error = NULL,
                    last_updated = ?
             WHERE id = ?",
        )
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn record_fetch_failure(
        &self,
        id: i64,
        error: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut message = error.to_string();
        message.truncate(500);
        sqlx::query(
            "UPDATE blocklists SET last_update_status = 'failed', last_error = ?,
                    last_updated = ?
             WHERE id = ?",
        )
        .bind(message)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    #[instrument(skip(self, domains), fields(count = domains.len()))]
    async fn replace_entries(
        &self,
        blocklist_id: i64,
        domains: &BTreeSet<String>,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM blocklist_entries WHERE blocklist_id = ?")
            .bind(blocklist_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        // Multi-row VALUES in chunks to stay under the bind-variable cap.
        let domains: Vec<&String> = domains.iter().collect();
        for chunk in domains.chunks(400) {
            let mut sql =
                String::from("INSERT INTO blocklist_entries (blocklist_id, domain) VALUES ");
            for (i, _) in chunk.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str("(?, ?)");
            }
            let mut query = sqlx::query(&sql);
            for domain in chunk {
                query = query.bind(blocklist_id).bind(domain.as_str());
            }
            query.execute(&mut *tx).await.map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn entries_for(&self, blocklist_id: i64) -> Result<Vec<String>, DomainError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT domain FROM blocklist_entries WHERE blocklist_id = ?")
                .bind(blocklist_id)
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows.into_iter().map(|(d,)| d).collect())
    }

    async fn search_entries(&self, domain: &str) -> Result<Vec<DomainSearchHit>, DomainError> {
        let rows = sqlx::query(
            "SELECT e.domain, b.id AS blocklist_id, b.name AS blocklist_name, b.list_type
             FROM blocklist_entries e
             JOIN blocklists b ON b.id = e.blocklist_id
             WHERE lower(e.domain) = lower(?)",
        )
        .bind(domain)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .iter()
            .map(|row| DomainSearchHit {
                domain: row.get("domain"),
                source: row.get("blocklist_name"),
                blocklist_id: Some(row.get("blocklist_id")),
                list_type: ListType::parse(&row.get::<String, _>("list_type"))
                    .unwrap_or(ListType::Block),
            })
            .collect())
    }
}
