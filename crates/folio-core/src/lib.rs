//! Folio Core Library
//!
//! This crate provides the domain models, error types, configuration and validation
//! shared by every Folio component: the document store backends, the upload client,
//! the editing services and the CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod store_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use store_types::StoreBackend;
