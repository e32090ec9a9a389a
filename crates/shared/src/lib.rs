//! Shared types, errors, and configuration for Quill.
//!
//! This crate provides common types used across all other crates:
//! - Request/response DTOs for the HTTP API
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod dto;
pub mod error;
pub mod types;

pub use config::{AppConfig, MediaSettings};
pub use error::{AppError, AppResult};
