//! QUINALAB — draw-history statistics and guess engine for the Quina
//! lottery.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod api;
pub mod config;
pub mod generator;
pub mod refresh;
pub mod source;
pub mod stats;
pub mod storage;
pub mod store;
pub mod types;
pub mod verifier;
