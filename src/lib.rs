//! Film Radar - movie and series metadata aggregation service
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod metadata;
pub mod pipeline;
pub mod quality;
pub mod server;
pub mod sources;
pub mod titles;
