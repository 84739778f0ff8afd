use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_application::ports::NodeCommandRepository;
use powerblockade_domain::{DomainError, NodeCommand};
use sqlx::{Row, SqlitePool};

pub struct SqliteNodeCommandRepository {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

fn json_column(row: &sqlx::sqlite::SqliteRow, name: &str) -> Option<serde_json::Value> {
    row.get::<Option<String>, _>(name)
        .and_then(|raw| serde_json::from_str(&raw).ok())
}

impl SqliteNodeCommandRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_command(row: &sqlx::sqlite::SqliteRow) -> NodeCommand {
        NodeCommand {
            id: Some(row.get("id")),
            node_id: row.get("node_id"),
            command: row.get("command"),
            params: json_column(row, "params"),
            created_at: row.get("created_at"),
            executed_at: row.get("executed_at"),
            result: json_column(row, "result"),
        }
    }
}

#[async_trait]
impl NodeCommandRepository for SqliteNodeCommandRepository {
    async fn queue(&self, command: NodeCommand) -> Result<NodeCommand, DomainError> {
        let params = command
            .params
            .as_ref()
            .map(|p| serde_json::to_string(p).unwrap_or_default());

        let result = sqlx::query(
            "INSERT INTO node_commands (node_id, command, params, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(command.node_id)
        .bind(&command.command)
        .bind(params)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(NodeCommand {
            id: Some(result.last_insert_rowid()),
            created_at: Some(Utc::now()),
            ..command
        })
    }

    async fn pending_for_node(&self, node_id: i64) -> Result<Vec<NodeCommand>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, node_id, command, params, created_at, executed_at, result
             FROM node_commands
             WHERE executed_at IS NULL AND (node_id = ? OR node_id IS NULL)
             ORDER BY created_at",
        )
        .bind(node_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.iter().map(Self::row_to_command).collect())
    }

    async fn mark_executed(
        &self,
        command_id: i64,
        result: serde_json::Value,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let outcome = sqlx::query(
            "UPDATE node_commands SET executed_at = ?, result = ? WHERE id = ?",
        )
        .bind(at)
        .bind(serde_json::to_string(&result).unwrap_or_default())
        .bind(command_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(outcome.rows_affected() > 0)
    }
}
