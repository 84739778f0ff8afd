//! Setting keys and their defaults. The settings table is a plain string
//! map; typed accessors live in the application layer.

pub const BLOCKING_STATE: &str = "blocking_state";
pub const CONFIG_VERSION: &str = "config_version";
pub const TIMEZONE: &str = "timezone";

pub const RETENTION_EVENTS_DAYS: &str = "retention_events_days";
pub const RETENTION_ROLLUPS_DAYS: &str = "retention_rollups_days";
pub const RETENTION_NODE_METRICS_DAYS: &str = "retention_node_metrics_days";

pub const ROLLUP_ENABLED: &str = "rollup_enabled";
pub const PTR_RESOLUTION_ENABLED: &str = "ptr_resolution_enabled";
pub const CACHE_HIT_THRESHOLD_MS: &str = "cache_hit_threshold_ms";

pub const PRECACHE_ENABLED: &str = "precache_enabled";
pub const PRECACHE_DOMAIN_COUNT: &str = "precache_domain_count";
pub const PRECACHE_IGNORE_TTL: &str = "precache_ignore_ttl";
pub const PRECACHE_CUSTOM_REFRESH_MINUTES: &str = "precache_custom_refresh_minutes";

/// Default returned when a key has no row. Unknown keys default to "".
pub fn default_for(key: &str) -> &'static str {
    match key {
        BLOCKING_STATE => "enabled",
        CONFIG_VERSION => "",
        TIMEZONE => "UTC",
        RETENTION_EVENTS_DAYS => "30",
        RETENTION_ROLLUPS_DAYS => "365",
        RETENTION_NODE_METRICS_DAYS => "30",
        ROLLUP_ENABLED => "true",
        PTR_RESOLUTION_ENABLED => "true",
        CACHE_HIT_THRESHOLD_MS => "5",
        PRECACHE_ENABLED => "false",
        PRECACHE_DOMAIN_COUNT => "1000",
        PRECACHE_IGNORE_TTL => "false",
        PRECACHE_CUSTOM_REFRESH_MINUTES => "60",
        _ => "",
    }
}
