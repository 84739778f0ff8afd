use async_trait::async_trait;
use powerblockade_application::ports::ResolverRuleRepository;
use powerblockade_domain::{ClientResolverRule, DomainError};
use sqlx::{Row, SqlitePool};

pub struct SqliteResolverRuleRepository {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

impl SqliteResolverRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_rule(row: &sqlx::sqlite::SqliteRow) -> ClientResolverRule {
        ClientResolverRule {
            id: Some(row.get("id")),
            subnet: row.get("subnet"),
            nameserver: row.get("nameserver"),
            priority: row.get("priority"),
            enabled: row.get("enabled"),
        }
    }
}

#[async_trait]
impl ResolverRuleRepository for SqliteResolverRuleRepository {
    async fn get_enabled_ordered(&self) -> Result<Vec<ClientResolverRule>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, subnet, nameserver, priority, enabled
             FROM client_resolver_rules
             WHERE enabled = 1
             ORDER BY priority ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.iter().map(Self::row_to_rule).collect())
    }

    async fn create(&self, rule: ClientResolverRule) -> Result<ClientResolverRule, DomainError> {
        rule.validate().map_err(DomainError::Validation)?;

        let result = sqlx::query(
            "INSERT INTO client_resolver_rules (subnet, nameserver, priority, enabled)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&rule.subnet)
        .bind(&rule.nameserver)
        .bind(rule.priority)
        .bind(rule.enabled)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(ClientResolverRule {
            id: Some(result.last_insert_rowid()),
            ..rule
        })
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM client_resolver_rules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("resolver rule {id}")));
        }
        Ok(())
    }
}
