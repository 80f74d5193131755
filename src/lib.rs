#![deny(missing_docs)]

//! Core library for the casestack ingestion and retrieval server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Text extraction from PDF and presentation files.
pub mod extract;
/// Language-model clients for summaries, tags, and answers.
pub mod generate;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Ingestion pipeline orchestration.
pub mod pipeline;
/// Record schema, validation, and tag parsing.
pub mod record;
/// Summary retriever backends.
pub mod retriever;
/// Candidate document enumeration.
pub mod source;
