//! Core bookkeeping logic for Partida.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Journal entries, balance rules and the posting state machine
//! - `chart` - Chart of accounts hierarchy
//! - `reports` - External report renderer interface

pub mod chart;
pub mod ledger;
pub mod reports;
