//! Dropsend Core Library
//!
//! This crate provides the domain models, error types, configuration, validation
//! and extension hooks shared across all Dropsend components.

pub mod config;
pub mod error;
pub mod hooks;
pub mod human_size;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ListenAddress, TransferConfig};
pub use error::{AppError, ErrorMetadata, FieldError, LogLevel};
pub use hooks::{DownloadNotice, DownloadNotifier, NoOpDownloadNotifier};
pub use human_size::human_size;
