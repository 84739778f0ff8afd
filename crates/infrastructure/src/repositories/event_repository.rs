use async_trait::async_trait;
use chrono::{DateTime, Utc};
use powerblockade_application::ports::{EventAggregate, EventRepository, EventWindowStats};
use powerblockade_domain::{DnsQueryEvent, DomainError};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Rows per INSERT statement; 12 binds each keeps us under SQLite's
/// bind-variable cap.
const INSERT_CHUNK: usize = 60;

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    #[instrument(skip(self, events), fields(batch = events.len()))]
    async fn ingest_batch(&self, mut events: Vec<DnsQueryEvent>) -> Result<u64, DomainError> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Upsert clients first so events can carry their ids. Last event
        // timestamp per IP wins for last_seen.
        let mut seen: HashMap<&str, DateTime<Utc>> = HashMap::new();
        for ev in &events {
            let entry = seen.entry(ev.client_ip.as_str()).or_insert(ev.ts);
            if ev.ts > *entry {
                *entry = ev.ts;
            }
        }

        let mut client_ids: HashMap<String, i64> = HashMap::with_capacity(seen.len());
        for (ip, last_seen) in &seen {
            sqlx::query(
                "INSERT INTO clients (ip, last_seen) VALUES (?, ?)
                 ON CONFLICT(ip) DO UPDATE SET last_seen = excluded.last_seen",
            )
            .bind(ip)
            .bind(last_seen)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            let id: i64 = sqlx::query_scalar("SELECT id FROM clients WHERE ip = ?")
                .bind(ip)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;
            client_ids.insert((*ip).to_string(), id);
        }

        for ev in &mut events {
            ev.client_id = client_ids.get(&ev.client_ip).copied();
        }

        // The partial unique index on event_id is what makes retries
        // exactly-once; conflicting rows are skipped, not errors.
        let mut inserted = 0u64;
        for chunk in events.chunks(INSERT_CHUNK) {
            let mut sql = String::from(
                "INSERT INTO dns_query_events
                    (event_id, ts, node_id, client_ip, client_id, qname, qtype, rcode,
                     blocked, block_reason, blocklist_name, latency_ms) VALUES ",
            );
            for (i, _) in chunk.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str("(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)");
            }
            sql.push_str(" ON CONFLICT DO NOTHING");

            let mut query = sqlx::query(&sql);
            for ev in chunk {
                query = query
                    .bind(&ev.event_id)
                    .bind(ev.ts)
                    .bind(ev.node_id)
                    .bind(&ev.client_ip)
                    .bind(ev.client_id)
                    .bind(&ev.qname)
                    .bind(ev.qtype as i64)
                    .bind(ev.rcode as i64)
                    .bind(ev.blocked)
                    .bind(&ev.block_reason)
                    .bind(&ev.blocklist_name)
                    .bind(ev.latency_ms);
            }

            let result = query.execute(&mut *tx).await.map_err(db_err)?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(db_err)?;
        debug!(inserted, "Event batch committed");
        Ok(inserted)
    }

    async fn aggregate_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cache_hit_threshold_ms: i64,
    ) -> Result<Vec<EventAggregate>, DomainError> {
        let rows = sqlx::query(
            "SELECT client_id, node_id,
                    COUNT(*) AS total,
                    SUM(CASE WHEN blocked = 1 THEN 1 ELSE 0 END) AS blocked,
                    SUM(CASE WHEN rcode = 3 THEN 1 ELSE 0 END) AS nxdomain,
                    SUM(CASE WHEN rcode = 2 THEN 1 ELSE 0 END) AS servfail,
                    SUM(CASE WHEN latency_ms IS NOT NULL AND latency_ms < ?
                        THEN 1 ELSE 0 END) AS cache_hits,
                    AVG(latency_ms) AS avg_latency,
                    COUNT(DISTINCT qname) AS unique_domains
             FROM dns_query_events
             WHERE ts >= ? AND ts < ?
             GROUP BY client_id, node_id",
        )
        .bind(cache_hit_threshold_ms)
        .bind(start)
        .bind(end)
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

    async fn top_domains(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<String>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT qname FROM dns_query_events
             WHERE ts >= ? AND blocked = 0 AND rcode = 0
             GROUP BY qname
             ORDER BY COUNT(*) DESC
             LIMIT ?",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(|(q,)| q).collect())
    }

    async fn window_stats(
        &self,
        since: DateTime<Utc>,
        cache_hit_threshold_ms: i64,
    ) -> Result<EventWindowStats, DomainError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total,
                    SUM(CASE WHEN blocked = 1 THEN 1 ELSE 0 END) AS blocked,
                    SUM(CASE WHEN blocked = 0 AND latency_ms IS NOT NULL AND latency_ms < ?
                        THEN 1 ELSE 0 END) AS cache_hits,
                    AVG(CASE WHEN blocked = 0 AND latency_ms < ?
                        THEN latency_ms END) AS avg_latency_hit,
                    AVG(CASE WHEN blocked = 0 AND latency_ms >= ?
                        THEN latency_ms END) AS avg_latency_miss
             FROM dns_query_events
             WHERE ts >= ?",
        )
        .bind(cache_hit_threshold_ms)
        .bind(cache_hit_threshold_ms)
        .bind(cache_hit_threshold_ms)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(EventWindowStats {
            total: row.get("total"),
            blocked: row.get::<Option<i64>, _>("blocked").unwrap_or(0),
            cache_hits: row.get::<Option<i64>, _>("cache_hits").unwrap_or(0),
            avg_latency_hit_ms: row
                .get::<Option<f64>, _>("avg_latency_hit")
                .unwrap_or(0.0),
            avg_latency_miss_ms: row
                .get::<Option<f64>, _>("avg_latency_miss")
                .unwrap_or(0.0),
        })
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM dns_query_events WHERE ts < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}
