//! `SQLite` storage for DormNet admin.
//!
//! Provides persistence for resident devices and issued vouchers.

mod db;
mod models;
mod queries;

pub use db::{Database, DatabaseError};
pub use models::*;
pub use queries::NewVoucher;
