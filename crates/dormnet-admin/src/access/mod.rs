//! Local-first workflows against the GWN Cloud controller.
//!
//! Every device mutation lands in the local database first; the matching
//! controller call is a best-effort mirror whose failure is reported to the
//! caller, never retried. Voucher issue is the one vendor-first operation,
//! since only the controller can generate codes.

mod devices;
mod vouchers;

pub use devices::{BlockOutcome, DeviceManager};
pub use vouchers::{RevokeOutcome, VoucherManager};

use dormnet_gwn::GwnError;

use crate::storage::DatabaseError;

/// Result of the controller half of a local-first operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorSync {
    /// The controller acknowledged the change.
    Synced,
    /// The controller call failed; the local change still stands.
    Failed(String),
}

impl VendorSync {
    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }
}

/// Errors from the device and voucher workflows.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The MAC address could not be normalized.
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    /// The billing month is not in YYYY-MM form.
    #[error("Invalid month (expected YYYY-MM): {0}")]
    InvalidMonth(String),

    /// The voucher was revoked earlier.
    #[error("Voucher already revoked: {0}")]
    AlreadyRevoked(String),

    /// Local database operation failed.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Controller call failed in a context where it is not best-effort.
    #[error(transparent)]
    Gwn(#[from] GwnError),
}
