//! Shared types and configuration for Partida.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Offset/limit pagination for list endpoints
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, PaginationConfig, ReportConfig, ReportStoreConfig};
