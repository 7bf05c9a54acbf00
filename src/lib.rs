//! Forecast service: daily forecast summaries backed by Weatherbit.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod provider;
pub mod pipeline;
pub mod server;
