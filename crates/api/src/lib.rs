//! PowerBlockade API Layer
//!
//! Axum routes and handlers for the node-sync protocol, the blocking
//! controls, node lifecycle operations, and the Prometheus exporter.

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::{AuthedNode, SessionUser, NODE_KEY_HEADER};
pub use error::ApiError;
pub use routes::create_routes;
pub use state::{AppState, VersionInfo};
