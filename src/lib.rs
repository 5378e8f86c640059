#![deny(missing_docs)]

//! Core library for the student registry server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Registry activity counters.
pub mod metrics;
/// Student record store and service layer.
pub mod records;
/// Summarization collaborators.
pub mod summarization;
