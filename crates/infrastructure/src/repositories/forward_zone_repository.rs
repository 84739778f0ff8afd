use async_trait::async_trait;
use powerblockade_application::ports::ForwardZoneRepository;
use powerblockade_domain::{DomainError, ForwardZone};
use sqlx::{Row, SqlitePool};
use tracing::instrument;

pub struct SqliteForwardZoneRepository {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

impl SqliteForwardZoneRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_zone(row: &sqlx::sqlite::SqliteRow) -> ForwardZone {
        ForwardZone {
            id: Some(row.get("id")),
            node_id: row.get("node_id"),
            domain: row.get("domain"),
            servers: row.get("servers"),
            enabled: row.get("enabled"),
        }
    }
}

#[async_trait]
impl ForwardZoneRepository for SqliteForwardZoneRepository {
    #[instrument(skip(self, zone), fields(domain = %zone.domain))]
    async fn create(&self, zone: ForwardZone) -> Result<ForwardZone, DomainError> {
        zone.validate().map_err(DomainError::Validation)?;

        let result = sqlx::query(
            "INSERT INTO forward_zones (node_id, domain, servers, enabled) VALUES (?, ?, ?, ?)",
        )
        .bind(zone.node_id)
        .bind(&zone.domain)
        .bind(&zone.servers)
        .bind(zone.enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                DomainError::Conflict(format!("Forward zone '{}' already exists", zone.domain))
            } else {
                db_err(e)
            }
        })?;

        Ok(ForwardZone {
            id: Some(result.last_insert_rowid()),
            ..zone
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ForwardZone>, DomainError> {
        let row = sqlx::query(
            "SELECT id, node_id, domain, servers, enabled FROM forward_zones WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.as_ref().map(Self::row_to_zone))
    }

    async fn get_enabled_global(&self) -> Result<Vec<ForwardZone>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, node_id, domain, servers, enabled FROM forward_zones
             WHERE enabled = 1 AND node_id IS NULL ORDER BY domain",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.iter().map(Self::row_to_zone).collect())
    }

    async fn get_for_node(&self, node_id: i64) -> Result<Vec<ForwardZone>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, node_id, domain, servers, enabled FROM forward_zones
             WHERE enabled = 1 AND (node_id IS NULL OR node_id = ?)
             ORDER BY domain, node_id",
        )
        .bind(node_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.iter().map(Self::row_to_zone).collect())
    }

    async fn update(&self, zone: &ForwardZone) -> Result<(), DomainError> {
        let Some(id) = zone.id else {
            return Err(DomainError::Validation("Forward zone has no id".to_string()));
        };
        zone.validate().map_err(DomainError::Validation)?;

        sqlx::query(
            "UPDATE forward_zones SET node_id = ?, domain = ?, servers = ?, enabled = ?
             WHERE id = ?",
        )
        .bind(zone.node_id)
        .bind(&zone.domain)
        .bind(&zone.servers)
        .bind(zone.enabled)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                DomainError::Conflict(format!("Forward zone '{}' already exists", zone.domain))
            } else {
                db_err(e)
            }
        })?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM forward_zones WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("forward zone {id}")));
        }
        Ok(())
    }
}
