#![deny(missing_docs)]

//! Core library for docsift: classify a document, extract its structure, and attach an
//! LLM-derived summary or data insight.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Text-completion client abstraction and provider adapters.
pub mod llm;
/// Structured logging and tracing setup.
pub mod logging;
/// Tagged value/empty/failed outcomes shared by extractors and completions.
pub mod outcome;
/// Document processing pipeline.
pub mod processing;
