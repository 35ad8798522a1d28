//! Shared types, errors, and configuration for Saldo.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Accounting periods and month ranges
//! - Application-wide error types
//! - Engine configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{AppError, AppResult};
