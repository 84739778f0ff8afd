use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_application::ports::NodeRepository;
use powerblockade_domain::{DomainError, Node, NodeStatus};
use sqlx::{Row, SqlitePool};
use tracing::{error, instrument};

pub struct SqliteNodeRepository {
    pool: SqlitePool,
}

impl SqliteNodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_node(row: &sqlx::sqlite::SqliteRow) -> Node {
        Node {
            id: Some(row.get("id")),
            name: row.get("name"),
            api_key: row.get("api_key"),
            ip_address: row.get("ip_address"),
            version: row.get("version"),
            status: NodeStatus::parse(&row.get::<String, _>("status"))
                .unwrap_or(NodeStatus::Pending),
            last_seen: row.get("last_seen"),
            last_error: row.get("last_error"),
            config_version: row.get("config_version"),
            queries_total: row.get("queries_total"),
            queries_blocked: row.get("queries_blocked"),
            created_at: row.get("created_at"),
        }
    }
}

const NODE_COLUMNS: &str = "id, name, api_key, ip_address, version, status, last_seen, \
                            last_error, config_version, queries_total, queries_blocked, created_at";

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl NodeRepository for SqliteNodeRepository {
    #[instrument(skip(self, node), fields(name = %node.name))]
    async fn create(&self, node: Node) -> Result<Node, DomainError> {
        let result = sqlx::query(
            "INSERT INTO nodes (name, api_key, ip_address, version, status, last_seen, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&node.name)
        .bind(&node.api_key)
        .bind(&node.ip_address)
        .bind(&node.version)
        .bind(node.status.as_str())
        .bind(node.last_seen)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                DomainError::Conflict(format!("Node '{}' already exists", node.name))
            } else {
                error!(error = %e, "Failed to create node");
                db_err(e)
            }
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::DatabaseError("Failed to fetch created node".to_string()))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Node>, DomainError> {
        let row = sqlx::query(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(Self::row_to_node))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Node>, DomainError> {
        let row = sqlx::query(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(Self::row_to_node))
    }

    async fn get_all(&self) -> Result<Vec<Node>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.iter().map(Self::row_to_node).collect())
    }

    async fn register(
        &self,
        id: i64,
        name: &str,
        ip_address: Option<&str>,
        version: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE nodes SET name = ?, ip_address = ?, version = ?,
                    status = 'active', last_seen = ?, last_error = NULL
             WHERE id = ?",
        )
        .bind(name)
        .bind(ip_address)
        .bind(version)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn heartbeat(
        &self,
        id: i64,
        version: Option<&str>,
        queries_total: Option<i64>,
        queries_blocked: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE nodes SET
                last_seen = ?,
                status = 'active',
                version = COALESCE(?, version),
                queries_total = COALESCE(?, queries_total),
                queries_blocked = COALESCE(?, queries_blocked)
             WHERE id = ?",
        )
        .bind(now)
        .bind(version)
        .bind(queries_total)
        .bind(queries_blocked)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn touch_last_seen(&self, id: i64, now: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query("UPDATE nodes SET last_seen = ?, status = 'active' WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn bump_config_version(&self, id: i64) -> Result<(), DomainError> {
        sqlx::query("UPDATE nodes SET config_version = config_version + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn clear_error(&self, id: i64) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE nodes SET last_error = NULL,
                    status = CASE WHEN status = 'error' THEN 'active' ELSE status END
             WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NodeNotFound(id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, api_key))]
    async fn ensure_node(
        &self,
        name: &str,
        api_key: &str,
        now: DateTime<Utc>,
    ) -> Result<Node, DomainError> {
        if let Some(existing) = self.get_by_name(name).await? {
            let Some(id) = existing.id else {
                return Ok(existing);
            };
            self.touch_last_seen(id, now).await?;
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DomainError::NodeNotFound(name.to_string()));
        }

        let mut node = Node::new(name.to_string(), api_key.to_string());
        node.status = NodeStatus::Active;
        node.last_seen = Some(now);
        self.create(node).await
    }
}
