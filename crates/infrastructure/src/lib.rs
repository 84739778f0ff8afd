//! PowerBlockade Infrastructure Layer
//!
//! Adapters behind the application ports: SQLite repositories, the
//! blocklist/recursor HTTP clients, the UDP DNS client, the shared-directory
//! policy store, and the secondary package builder.

pub mod database;
pub mod dns;
pub mod http;
pub mod package;
pub mod policy_store;
pub mod repositories;

pub use policy_store::FsPolicyStore;
