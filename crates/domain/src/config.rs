//! Environment-driven process configuration.
//!
//! The primary refuses to serve traffic with default admin credentials
//! unless the operator explicitly opts into insecure mode.

use crate::errors::DomainError;
use std::env;

const INSECURE_DEFAULTS: &[&str] = &["change-me", "password", "admin", "secret", ""];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub admin_secret_key: String,
    pub admin_username: String,
    pub admin_password: String,
    pub primary_api_key: Option<String>,
    pub node_name: Option<String>,
    pub shared_dir: String,
    pub recursor_api_url: Option<String>,
    pub recursor_api_key: Option<String>,
    pub resolver_addr: String,
    pub bind_addr: String,
    pub allow_insecure: bool,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub write_pool_max_connections: u32,
    pub read_pool_max_connections: u32,
    pub write_busy_timeout_secs: u64,
    pub wal_autocheckpoint: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            write_pool_max_connections: 4,
            read_pool_max_connections: 8,
            write_busy_timeout_secs: 30,
            wal_autocheckpoint: 1000,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Load from the process environment. Missing optional values fall back
    /// to development defaults; `validate_security` decides whether those
    /// defaults are allowed to boot.
    pub fn from_env() -> Self {
        Self {
            database_url: env_opt("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://powerblockade.db".to_string()),
            admin_secret_key: env::var("ADMIN_SECRET_KEY").unwrap_or_default(),
            admin_username: env_opt("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            primary_api_key: env_opt("PRIMARY_API_KEY"),
            node_name: env_opt("NODE_NAME"),
            shared_dir: env_opt("SHARED_DIR").unwrap_or_else(|| "/shared".to_string()),
            recursor_api_url: env_opt("RECURSOR_API_URL"),
            recursor_api_key: env_opt("RECURSOR_API_KEY"),
            resolver_addr: env_opt("RESOLVER_ADDR").unwrap_or_else(|| "127.0.0.1:53".to_string()),
            bind_addr: env_opt("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            allow_insecure: env::var("POWERBLOCKADE_ALLOW_INSECURE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            database: DatabaseConfig::default(),
        }
    }

    /// Reject boot on default/weak admin credentials.
    ///
    /// Returns the list of issues when `allow_insecure` is set so the
    /// caller can log them loudly instead of exiting.
    pub fn validate_security(&self) -> Result<Vec<String>, DomainError> {
        let mut issues = Vec::new();

        if INSECURE_DEFAULTS.contains(&self.admin_password.as_str()) {
            issues.push("ADMIN_PASSWORD is set to a default/weak value".to_string());
        }
        if INSECURE_DEFAULTS.contains(&self.admin_secret_key.as_str()) {
            issues.push("ADMIN_SECRET_KEY is set to a default/weak value".to_string());
        }
        if let Some(key) = &self.primary_api_key {
            if INSECURE_DEFAULTS.contains(&key.as_str()) {
                issues.push("PRIMARY_API_KEY is set to a default/weak value".to_string());
            }
        }

        if issues.is_empty() || self.allow_insecure {
            return Ok(issues);
        }
        Err(DomainError::SecurityRefusal(issues.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secure_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            admin_secret_key: "c0ffee-long-random-value".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "s3cure-pass-phrase".to_string(),
            primary_api_key: None,
            node_name: None,
            shared_dir: "/shared".to_string(),
            recursor_api_url: None,
            recursor_api_key: None,
            resolver_addr: "127.0.0.1:53".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            allow_insecure: false,
            database: DatabaseConfig::default(),
        }
    }

    #[test]
    fn secure_credentials_pass() {
        assert!(secure_config().validate_security().unwrap().is_empty());
    }

    #[test]
    fn default_password_refuses_boot() {
        let mut cfg = secure_config();
        cfg.admin_password = "change-me".to_string();
        assert!(matches!(
            cfg.validate_security(),
            Err(DomainError::SecurityRefusal(_))
        ));
    }

    #[test]
    fn insecure_bypass_reports_issues_without_refusing() {
        let mut cfg = secure_config();
        cfg.admin_password = String::new();
        cfg.allow_insecure = true;
        let issues = cfg.validate_security().unwrap();
        assert_eq!(issues.len(), 1);
    }
}
