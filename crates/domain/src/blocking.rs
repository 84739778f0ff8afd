//! The global blocking state machine.
//!
//! Persisted as a single setting: `"enabled"`, `"disabled"`, or an RFC 3339
//! instant meaning "paused until". Unknown values read as enabled so a
//! corrupt setting can never silently turn blocking off.

use chrono::{DateTime, Utc};

pub const PAUSE_MIN_MINUTES: i64 = 1;
pub const PAUSE_MAX_MINUTES: i64 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingState {
    Enabled,
    Disabled,
    PausedUntil(DateTime<Utc>),
}

impl BlockingState {
    pub fn parse(value: &str) -> Self {
        match value {
            "enabled" | "" => BlockingState::Enabled,
            "disabled" => BlockingState::Disabled,
            other => match DateTime::parse_from_rfc3339(other) {
                Ok(ts) => BlockingState::PausedUntil(ts.with_timezone(&Utc)),
                Err(_) => BlockingState::Enabled,
            },
        }
    }

    pub fn as_setting_value(&self) -> String {
        match self {
            BlockingState::Enabled => "enabled".to_string(),
            BlockingState::Disabled => "disabled".to_string(),
            BlockingState::PausedUntil(ts) => ts.to_rfc3339(),
        }
    }

    /// Blocking is active when enabled, or when a pause has expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self {
            BlockingState::Enabled => true,
            BlockingState::Disabled => false,
            BlockingState::PausedUntil(until) => now >= *until,
        }
    }

    /// Seconds left on a running pause, if any.
    pub fn pause_remaining_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        match self {
            BlockingState::PausedUntil(until) if *until > now => {
                Some((*until - now).num_seconds())
            }
            _ => None,
        }
    }

    pub fn validate_pause_minutes(minutes: i64) -> Result<(), String> {
        if !(PAUSE_MIN_MINUTES..=PAUSE_MAX_MINUTES).contains(&minutes) {
            return Err(format!(
                "Minutes must be between {PAUSE_MIN_MINUTES} and {PAUSE_MAX_MINUTES}"
            ));
        }
        Ok(())
    }
}
