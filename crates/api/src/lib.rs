//! # LexSync API
//!
//! HTTP surface and process wiring.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - The axum router for manual, scheduled and health endpoints
//! - Main entry point and setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod http;
pub mod utils;

pub use context::AppContext;
pub use http::router;
