//! DormNet core library.
//!
//! Shared plumbing for DormNet components:
//! - Configuration resolution and hierarchy
//! - SQLite pool helpers and shared database error types
//! - Tracing/logging initialization
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
