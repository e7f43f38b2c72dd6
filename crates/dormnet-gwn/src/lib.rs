//! GWN Cloud API client.
//!
//! Covers the slice of Grandstream's GWN Cloud OpenAPI surface that DormNet
//! uses to manage accommodation Wi-Fi:
//! - token acquisition with a shared in-process cache
//! - per-request HMAC signing
//! - response normalization across the API's payload shape variants
//! - typed operations for clients, access points, SSIDs, networks, and
//!   vouchers

pub mod client;
pub mod config;
pub mod error;
pub mod mac;
pub mod response;
pub mod sign;
pub mod token;
pub mod types;


pub use client::GwnClient;
pub use config::GwnConfig;
pub use error::{GwnError, Result};
pub use response::{NormalizedRow, VendorResponse};
pub use token::{AccessToken, TokenCache};
