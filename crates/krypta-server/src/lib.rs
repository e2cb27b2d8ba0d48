//! # Krypta server
//!
//! HTTP surface of the Krypta end-to-end encrypted file storage service.
//!
//! This crate provides:
//! - **JSON API**: POST endpoints wrapped in the `hasError` envelope
//! - **Blob streaming**: raw octet-stream read/write with the
//!   `nk-crypto-meta` header carried bit-exact
//! - **Authentication**: Bearer API keys resolved against the session cache
//! - **Operations**: health probes and Prometheus metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │                   HTTP clients                    │
//! └─────────────────────────┬─────────────────────────┘
//!                           │
//! ┌─────────────────────────▼─────────────────────────┐
//! │                   krypta-server                   │
//! ├───────────────────────────────────────────────────┤
//! │ recovery │ request-id │ logging │ CORS │ auth     │
//! ├───────────────────────────────────────────────────┤
//! │   handlers (user, admin, bucket, dir, file, blob) │
//! ├───────────────────────────────────────────────────┤
//! │                   krypta-core                     │
//! │      (services, repositories, Postgres/redis)     │
//! ├───────────────────────────────────────────────────┤
//! │                   krypta-store                    │
//! │           (S3-compatible object store)            │
//! └───────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::Settings;
pub use error::ApiError;
pub use server::run_server;
pub use state::AppState;
