//! Core infrastructure.
//!
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Error types
//! - [`host`] - Process-stable host identity
//! - [`runtime`] - Detached task scheduling

pub mod config;
pub mod error;
pub mod host;
pub mod runtime;
