//! Database models for DormNet admin.

use serde::{Deserialize, Serialize};

/// Device record from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub mac: String,
    pub owner: String,
    pub name: Option<String>,
    pub blocked: i64,
    pub block_reason: Option<String>,
    pub blocked_at: Option<i64>,
    pub blocked_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Device {
    pub const fn is_blocked(&self) -> bool {
        self.blocked != 0
    }
}

/// Voucher record from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Voucher {
    pub id: String,
    pub code: String,
    pub vendor_id: Option<String>,
    pub owner: String,
    pub month: String,
    pub group_id: String,
    pub status: String,
    pub active: i64,
    pub created_at: i64,
    pub revoked_at: Option<i64>,
    pub revoked_by: Option<String>,
}

impl Voucher {
    pub const fn is_active(&self) -> bool {
        self.active != 0
    }
}

/// Delivery status of a voucher code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoucherStatus {
    /// Issued but not yet handed to the resident.
    Unused,
    /// Code delivered to the resident.
    Sent,
    /// Delivery failed and needs operator attention.
    Failed,
}

impl VoucherStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
