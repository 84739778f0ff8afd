//! PowerBlockade Domain Layer
//!
//! Entities and pure policy logic shared by every other crate: blocklist
//! parsing and RPZ rendering, schedule-window evaluation, the blocking
//! state machine, and the process configuration.

pub mod blocking;
pub mod blocklist;
pub mod client;
pub mod config;
pub mod config_change;
pub mod errors;
pub mod forward_zone;
pub mod node;
pub mod node_command;
pub mod node_metrics;
pub mod policy;
pub mod query_event;
pub mod resolver_rule;
pub mod rollup;
pub mod schedule;
pub mod settings;

pub use blocking::BlockingState;
pub use blocklist::{Blocklist, BlocklistEntry, BlocklistFormat, DomainSearchHit, ListType, ManualEntry};
pub use client::{Client, ClientGroup};
pub use config::{AppConfig, DatabaseConfig};
pub use config_change::ConfigChange;
pub use errors::DomainError;
pub use forward_zone::ForwardZone;
pub use node::{Node, NodeHealth, NodeStatus, PRIMARY_NODE_NAME};
pub use node_command::{NodeCommand, COMMAND_CLEAR_CACHE};
pub use node_metrics::NodeMetrics;
pub use query_event::{normalize_qname, DnsQueryEvent};
pub use resolver_rule::{ClientResolverRule, RuleMatcher};
pub use rollup::{Granularity, QueryRollup, RollupTotals};
