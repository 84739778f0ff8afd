use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_application::ports::{EventAggregate, RollupRepository};
use powerblockade_domain::{DomainError, QueryRollup, RollupTotals};
use sqlx::{Row, SqlitePool};

pub struct SqliteRollupRepository {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

impl SqliteRollupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RollupRepository for SqliteRollupRepository {
    /// Update-then-insert rather than ON CONFLICT: the bucket key contains
    /// nullable columns, which SQLite's unique index treats as distinct, so
    /// the match must use IS.
    async fn upsert(&self, rollup: &QueryRollup) -> Result<(), DomainError> {
        let updated = sqlx::query(
            "UPDATE query_rollups SET
                total_queries = ?, blocked_queries = ?, nxdomain_count = ?,
                servfail_count = ?, cache_hits = ?, avg_latency_ms = ?, unique_domains = ?
             WHERE bucket_start = ? AND granularity = ?
               AND client_id IS ? AND node_id IS ?",
        )
        .bind(rollup.total_queries)
        .bind(rollup.blocked_queries)
        .bind(rollup.nxdomain_count)
        .bind(rollup.servfail_count)
        .bind(rollup.cache_hits)
        .bind(rollup.avg_latency_ms)
        .bind(rollup.unique_domains)
        .bind(rollup.bucket_start)
        .bind(rollup.granularity.as_str())
        .bind(rollup.client_id)
        .bind(rollup.node_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if updated.rows_affected() > 0 {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO query_rollups
                (bucket_start, granularity, client_id, node_id, total_queries,
                 blocked_queries, nxdomain_count, servfail_count, cache_hits,
                 avg_latency_ms, unique_domains)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(rollup.bucket_start)
        .bind(rollup.granularity.as_str())
        .bind(rollup.client_id)
        .bind(rollup.node_id)
        .bind(rollup.total_queries)
        .bind(rollup.blocked_queries)
        .bind(rollup.nxdomain_count)
        .bind(rollup.servfail_count)
        .bind(rollup.cache_hits)
        .bind(rollup.avg_latency_ms)
        .bind(rollup.unique_domains)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn aggregate_daily_from_hourly(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<EventAggregate>, DomainError> {
        let rows = sqlx::query(
            "SELECT client_id, node_id,
                    SUM(total_queries) AS total,
                    SUM(blocked_queries) AS blocked,
                    SUM(nxdomain_count) AS nxdomain,
                    SUM(servfail_count) AS servfail,
                    SUM(cache_hits) AS cache_hits,
                    AVG(avg_latency_ms) AS avg_latency,
                    SUM(unique_domains) AS unique_domains
             FROM query_rollups
             WHERE bucket_start >= ? AND bucket_start < ? AND granularity = 'hourly'
             GROUP BY client_id, node_id",
        )
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .iter()
            .map(|row| EventAggregate {
                client_id: row.get("client_id"),
                node_id: row.get("node_id"),
                total: row.get("total"),
                blocked: row.get("blocked"),
                nxdomain: row.get("nxdomain"),
                servfail: row.get("servfail"),
                cache_hits: row.get("cache_hits"),
                avg_latency_ms: row.get("avg_latency"),
                unique_domains: row.get("unique_domains"),
            })
            .collect())
    }

    async fn totals_since(&self, cutoff: DateTime<Utc>) -> Result<RollupTotals, DomainError> {
        let row = sqlx::query(
            "SELECT SUM(total_queries) AS total,
                    SUM(blocked_queries) AS blocked,
                    SUM(nxdomain_count) AS nxdomain,
                    SUM(servfail_count) AS servfail,
                    SUM(cache_hits) AS cache_hits,
                    AVG(avg_latency_ms) AS avg_latency
             FROM query_rollups
             WHERE bucket_start >= ? AND granularity = 'hourly'",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(RollupTotals {
            total_queries: row.get::<Option<i64>, _>("total").unwrap_or(0),
            blocked_queries: row.get::<Option<i64>, _>("blocked").unwrap_or(0),
            nxdomain_count: row.get::<Option<i64>, _>("nxdomain").unwrap_or(0),
            servfail_count: row.get::<Option<i64>, _>("servfail").unwrap_or(0),
            cache_hits: row.get::<Option<i64>, _>("cache_hits").unwrap_or(0),
            avg_latency_ms: row
                .get::<Option<f64>, _>("avg_latency")
                .map(|v| v as i64)
                .unwrap_or(0),
        })
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM query_rollups WHERE bucket_start < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}
