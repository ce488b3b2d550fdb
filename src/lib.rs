//! STAKEBOOK — Personal Sports-Betting Ledger Engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod api;
pub mod auth;
pub mod config;
pub mod ledger;
pub mod storage;
pub mod types;
