use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_application::ports::NodeMetricsRepository;
use powerblockade_domain::{DomainError, NodeMetrics};
use sqlx::{Row, SqlitePool};

pub struct SqliteNodeMetricsRepository {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

const METRIC_COLUMNS: &str = "node_id, ts, cache_hits, cache_misses, cache_entries, \
    packetcache_hits, packetcache_misses, answers_0_1, answers_1_10, answers_10_100, \
    answers_100_1000, answers_slow, concurrent_queries, outgoing_timeouts, servfail_answers, \
    nxdomain_answers, questions, all_outqueries, uptime_seconds";

impl SqliteNodeMetricsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_metrics(row: &sqlx::sqlite::SqliteRow) -> NodeMetrics {
        NodeMetrics {
            id: row.try_get("id").ok(),
            node_id: row.get("node_id"),
            ts: row.get("ts"),
            cache_hits: row.get("cache_hits"),
            cache_misses: row.get("cache_misses"),
            cache_entries: row.get("cache_entries"),
            packetcache_hits: row.get("packetcache_hits"),
            packetcache_misses: row.get("packetcache_misses"),
            answers_0_1: row.get("answers_0_1"),
            answers_1_10: row.get("answers_1_10"),
            answers_10_100: row.get("answers_10_100"),
            answers_100_1000: row.get("answers_100_1000"),
            answers_slow: row.get("answers_slow"),
            concurrent_queries: row.get("concurrent_queries"),
            outgoing_timeouts: row.get("outgoing_timeouts"),
            servfail_answers: row.get("servfail_answers"),
            nxdomain_answers: row.get("nxdomain_answers"),
            questions: row.get("questions"),
            all_outqueries: row.get("all_outqueries"),
            uptime_seconds: row.get("uptime_seconds"),
        }
    }
}

#[async_trait]
impl NodeMetricsRepository for SqliteNodeMetricsRepository {
    async fn insert(&self, m: &NodeMetrics) -> Result<(), DomainError> {
        sqlx::query(&format!(
            "INSERT INTO node_metrics ({METRIC_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(m.node_id)
        .bind(m.ts.unwrap_or_else(Utc::now))
        .bind(m.cache_hits)
        .bind(m.cache_misses)
        .bind(m.cache_entries)
        .bind(m.packetcache_hits)
        .bind(m.packetcache_misses)
        .bind(m.answers_0_1)
        .bind(m.answers_1_10)
        .bind(m.answers_10_100)
        .bind(m.answers_100_1000)
        .bind(m.answers_slow)
        .bind(m.concurrent_queries)
        .bind(m.outgoing_timeouts)
        .bind(m.servfail_answers)
        .bind(m.nxdomain_answers)
        .bind(m.questions)
        .bind(m.all_outqueries)
        .bind(m.uptime_seconds)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn latest_for_node(&self, node_id: i64) -> Result<Option<NodeMetrics>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT id, {METRIC_COLUMNS} FROM node_metrics
             WHERE node_id = ? ORDER BY ts DESC LIMIT 1"
        ))
        .bind(node_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.as_ref().map(Self::row_to_metrics))
    }

    async fn latest_per_node(&self) -> Result<Vec<(String, NodeMetrics)>, DomainError> {
        let rows = sqlx::query(
            "SELECT n.name AS node_name, m.*
             FROM node_metrics m
             JOIN nodes n ON n.id = m.node_id
             JOIN (SELECT node_id, MAX(id) AS max_id FROM node_metrics GROUP BY node_id) latest
               ON latest.max_id = m.id
             ORDER BY n.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .iter()
            .map(|row| (row.get("node_name"), Self::row_to_metrics(row)))
            .collect())
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM node_metrics WHERE ts < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}
