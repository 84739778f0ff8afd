use async_trait::async_trait;
use chrono::Utc;
use powerblockade_application::ports::ConfigChangeRepository;
use powerblockade_domain::{ConfigChange, DomainError};
use sqlx::{Row, SqlitePool};

pub struct SqliteConfigChangeRepository {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

fn json_column(row: &sqlx::sqlite::SqliteRow, name: &str) -> Option<serde_json::Value> {
    row.get::<Option<String>, _>(name)
        .and_then(|raw| serde_json::from_str(&raw).ok())
}

const CHANGE_COLUMNS: &str =
    "id, entity_type, entity_id, action, actor_user_id, before_data, after_data, comment, created_at";

impl SqliteConfigChangeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_change(row: &sqlx::sqlite::SqliteRow) -> ConfigChange {
        ConfigChange {
            id: Some(row.get("id")),
            entity_type: row.get("entity_type"),
            entity_id: row.get("entity_id"),
            action: row.get("action"),
            actor_user_id: row.get("actor_user_id"),
            before_data: json_column(row, "before_data"),
            after_data: json_column(row, "after_data"),
            comment: row.get("comment"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl ConfigChangeRepository for SqliteConfigChangeRepository {
    async fn record(&self, change: ConfigChange) -> Result<ConfigChange, DomainError> {
        let before = change
            .before_data
            .as_ref()
            .map(|v| serde_json::to_string(v).unwrap_or_default());
        let after = change
            .after_data
            .as_ref()
            .map(|v| serde_json::to_string(v).unwrap_or_default());

        let result = sqlx::query(
            "INSERT INTO config_changes
                (entity_type, entity_id, action, actor_user_id, before_data, after_data,
                 comment, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&change.entity_type)
        .bind(change.entity_id)
        .bind(&change.action)
        .bind(change.actor_user_id)
        .bind(before)
        .bind(after)
        .bind(&change.comment)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(ConfigChange {
            id: Some(result.last_insert_rowid()),
            ..change
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ConfigChange>, DomainError> {
        let sql = format!("SELECT {CHANGE_COLUMNS} FROM config_changes WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(Self::row_to_change))
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ConfigChange>, DomainError> {
        let sql = format!(
            "SELECT {CHANGE_COLUMNS} FROM config_changes ORDER BY created_at DESC, id DESC LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(Self::row_to_change).collect())
    }

    async fn for_entity(
        &self,
        entity_type: &str,
        entity_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<ConfigChange>, DomainError> {
        let sql = format!(
            "SELECT {CHANGE_COLUMNS} FROM config_changes
             WHERE entity_type = ? AND (? IS NULL OR entity_id = ?)
             ORDER BY created_at DESC, id DESC LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(entity_type)
            .bind(entity_id)
            .bind(entity_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(Self::row_to_change).collect())
    }
}
