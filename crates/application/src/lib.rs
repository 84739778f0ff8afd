//! PowerBlockade Application Layer
//!
//! Ports (async traits over storage and the outside world) and the use
//! cases that orchestrate them: policy compilation, the node-sync
//! protocol, the ingest/rollup pipeline, and the background job bodies.

pub mod ports;
pub mod services;
pub mod use_cases;
