use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;
use powerblockade_application::ports::ClientRepository;
use powerblockade_domain::{Client, ClientGroup, DomainError};
use sqlx::{Row, SqlitePool};
use std::net::IpAddr;
use tracing::{error, instrument};

pub struct SqliteClientRepository {
    pool: SqlitePool,
}

impl SqliteClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_client(row: &sqlx::sqlite::SqliteRow) -> Client {
        Client {
            id: Some(row.get("id")),
            ip: row.get("ip"),
            display_name: row.get("display_name"),
            rdns_name: row.get("rdns_name"),
            rdns_last_resolved_at: row.get("rdns_last_resolved_at"),
            rdns_last_error: row.get("rdns_last_error"),
            last_seen: row.get("last_seen"),
            group_id: row.get("group_id"),
        }
    }
}

const CLIENT_COLUMNS: &str = "id, ip, display_name, rdns_name, rdns_last_resolved_at, \
                              rdns_last_error, last_seen, group_id";

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl ClientRepository for SqliteClientRepository {
    async fn get_by_ip(&self, ip: &str) -> Result<Option<Client>, DomainError> {
        let row = sqlx::query(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE ip = ?"))
            .bind(ip)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(Self::row_to_client))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Client>, DomainError> {
        let row = sqlx::query(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(Self::row_to_client))
    }

    async fn set_rdns_result(
        &self,
        ip: &str,
        rdns_name: Option<&str>,
        rdns_error: Option<&str>,
        resolved_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE clients SET rdns_name = COALESCE(?, rdns_name),
                    rdns_last_error = ?, rdns_last_resolved_at = ?
             WHERE ip = ?",
        )
        .bind(rdns_name)
        .bind(rdns_error)
        .bind(resolved_at)
        .bind(ip)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    #[instrument(skip(self, group), fields(name = %group.name))]
    async fn save_group(&self, group: ClientGroup) -> Result<ClientGroup, DomainError> {
        ClientGroup::validate_name(&group.name).map_err(DomainError::Validation)?;

        let id = match group.id {
            Some(id) => {
                sqlx::query("UPDATE client_groups SET name = ?, cidr = ?, color = ? WHERE id = ?")
                    .bind(&group.name)
                    .bind(&group.cidr)
                    .bind(&group.color)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(db_err)?;
                id
            }
            None => sqlx::query("INSERT INTO client_groups (name, cidr, color) VALUES (?, ?, ?)")
                .bind(&group.name)
                .bind(&group.cidr)
                .bind(&group.color)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    if e.to_string().contains("UNIQUE constraint failed") {
                        DomainError::Conflict(format!("Group '{}' already exists", group.name))
                    } else {
                        error!(error = %e, "Failed to create client group");
                        db_err(e)
                    }
                })?
                .last_insert_rowid(),
        };

        Ok(ClientGroup {
            id: Some(id),
            ..group
        })
    }

    async fn assign_ungrouped_in_cidr(
        &self,
        group_id: i64,
        cidr: &str,
    ) -> Result<u64, DomainError> {
        let network: IpNetwork = cidr
            .parse()
            .map_err(|_| DomainError::Validation(format!("Invalid CIDR '{cidr}'")))?;

        // CIDR containment can't be expressed portably in SQLite; scan the
        // ungrouped rows and match in process.
        let rows = sqlx::query("SELECT id, ip FROM clients WHERE group_id IS NULL")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut assigned = 0u64;
        for row in rows {
            let ip_str: String = row.get("ip");
            let Ok(ip) = ip_str.parse::<IpAddr>() else {
                continue;
            };
            if !network.contains(ip) {
                continue;
            }
            let id: i64 = row.get("id");
            sqlx::query("UPDATE clients SET group_id = ? WHERE id = ?")
                .bind(group_id)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
            assigned += 1;
        }
        Ok(assigned)
    }
}
