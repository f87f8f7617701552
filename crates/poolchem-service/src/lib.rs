//! HTTP REST API for pool water dosing recommendations.
//!
//! This crate provides a service that:
//! - Stores pools, their target profiles and chemistry readings
//! - Computes dosing recommendations with `poolchem-core`
//! - Reports where each parameter sits against the pool's targets
//!
//! # REST API Endpoints
//!
//! Requests other than the first two must carry an `X-Org-Id` header.
//!
//! - `GET /api/health` - Service health check
//! - `GET /api/targets/default` - Built-in target profile
//! - `POST /api/pools` / `GET /api/pools` - Create and list pools
//! - `GET /api/pools/{id}` - Get a pool
//! - `PUT /api/pools/{id}/targets` - Replace or clear a pool's target profile
//! - `POST /api/pools/{id}/readings` / `GET /api/pools/{id}/readings` - Store and query readings
//! - `GET /api/pools/{id}/readings/latest` - Most recent reading
//! - `GET /api/pools/{id}/status` - Parameter status of the latest reading
//! - `POST /api/dosing/recommendations` - Dosing recommendations
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/poolchem/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//! request_timeout_secs = 30
//!
//! [storage]
//! path = "~/.local/share/poolchem/data.db"
//! ```

pub mod api;
pub mod config;
pub mod state;

pub use config::{Config, ConfigError, ServerConfig, StorageConfig, ValidationError};
pub use state::AppState;
