//! Voucher issue, revoke, and lookup workflows.

use std::sync::LazyLock;

use dormnet_gwn::GwnClient;
use dormnet_gwn::types::{GenerateVoucherRequest, VendorVoucher};
use regex::Regex;
use tracing::{error, warn};
use uuid::Uuid;

use super::{AccessError, VendorSync};
use crate::storage::{Database, DatabaseError, NewVoucher, Voucher, VoucherStatus};

/// Pre-compiled regex for validating `YYYY-MM` billing months.
#[allow(clippy::expect_used)]
static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("static regex is valid"));

/// How many controller pages a code search will walk before giving up.
const LOCATE_PAGE_LIMIT: u32 = 50;
const LOCATE_PAGE_SIZE: u32 = 100;

/// Outcome of a revoke request.
#[derive(Debug)]
pub struct RevokeOutcome {
    pub voucher: Voucher,
    pub vendor: VendorSync,
}

/// Voucher workflows.
///
/// Issue is vendor-first: only the controller can generate codes, so no
/// local row exists until the controller handed one out. Revoke is
/// local-first like the device workflows.
#[derive(Clone)]
pub struct VoucherManager {
    db: Database,
    gwn: GwnClient,
}

impl VoucherManager {
    pub const fn new(db: Database, gwn: GwnClient) -> Self {
        Self { db, gwn }
    }

    /// Issue a voucher for a resident's billing month.
    ///
    /// A controller failure leaves no local row behind; a local insert
    /// failure after the controller accepted is logged with the code so the
    /// operator can recover it.
    pub async fn issue_voucher(
        &self,
        owner: &str,
        month: &str,
        group_id: &str,
        duration_days: u32,
        device_limit: u32,
        note: Option<String>,
    ) -> Result<Voucher, AccessError> {
        if !MONTH_RE.is_match(month) {
            return Err(AccessError::InvalidMonth(month.to_string()));
        }

        let request = GenerateVoucherRequest {
            group_id: group_id.to_string(),
            quantity: 1,
            duration_days,
            device_limit,
            note,
        };
        let issued = self.gwn.generate_voucher(&request).await?;

        let id = Uuid::new_v4().to_string();
        let inserted = self
            .db
            .insert_voucher(&NewVoucher {
                id: &id,
                code: &issued.code,
                vendor_id: issued.vendor_id.as_deref(),
                owner,
                month,
                group_id,
                status: VoucherStatus::Sent,
            })
            .await;

        match inserted {
            Ok(voucher) => Ok(voucher),
            Err(e) => {
                error!(
                    code = %issued.code,
                    error = %e,
                    "Voucher created on the controller but the local insert failed"
                );
                Err(e.into())
            }
        }
    }

    /// Revoke a voucher locally, then delete it from the controller.
    pub async fn revoke_voucher(
        &self,
        code: &str,
        actor: Option<&str>,
    ) -> Result<RevokeOutcome, AccessError> {
        let voucher = self.db.get_voucher_by_code(code).await?;
        if !voucher.is_active() {
            return Err(AccessError::AlreadyRevoked(code.to_string()));
        }

        let voucher = self.db.mark_voucher_revoked(&voucher.id, actor).await?;

        let vendor = match &voucher.vendor_id {
            Some(vendor_id) => match self.gwn.delete_voucher(vendor_id).await {
                Ok(()) => VendorSync::Synced,
                Err(e) => {
                    warn!(
                        code = %voucher.code,
                        error = %e,
                        "Controller delete failed; voucher stays revoked locally"
                    );
                    VendorSync::Failed(e.to_string())
                }
            },
            None => {
                warn!(code = %voucher.code, "No controller ID recorded; revoked locally only");
                VendorSync::Failed("no controller voucher id recorded".to_string())
            }
        };

        Ok(RevokeOutcome { voucher, vendor })
    }

    /// List locally tracked vouchers, optionally filtered by owner and month.
    pub async fn list_vouchers(
        &self,
        owner: Option<&str>,
        month: Option<&str>,
    ) -> Result<Vec<Voucher>, AccessError> {
        Ok(self.db.list_vouchers(owner, month).await?)
    }

    /// Look up a locally tracked voucher by code.
    pub async fn find_voucher(&self, code: &str) -> Result<Voucher, AccessError> {
        Ok(self.db.get_voucher_by_code(code).await?)
    }

    /// Update the delivery status of a voucher.
    pub async fn set_status(
        &self,
        code: &str,
        status: VoucherStatus,
    ) -> Result<Voucher, AccessError> {
        let voucher = self.db.get_voucher_by_code(code).await?;
        Ok(self.db.set_voucher_status(&voucher.id, status).await?)
    }

    /// Search the controller's listing of a group for a code.
    ///
    /// Pages through the group until the code shows up, a short page signals
    /// the end, or the page cap is hit. When the code is found and a local
    /// row is missing its controller ID, the ID is backfilled.
    pub async fn locate_vendor_voucher(
        &self,
        group_id: &str,
        code: &str,
    ) -> Result<Option<VendorVoucher>, AccessError> {
        for page in 1..=LOCATE_PAGE_LIMIT {
            let batch = self
                .gwn
                .get_group_vouchers(group_id, page, LOCATE_PAGE_SIZE)
                .await?;

            if let Some(found) = batch.vouchers.iter().find(|v| v.code == code) {
                self.backfill_vendor_id(code, found).await?;
                return Ok(Some(found.clone()));
            }
            // End of listing by the controller's own row count; rows dropped
            // for a missing code must not cut the scan short.
            if batch.row_count < LOCATE_PAGE_SIZE as usize {
                break;
            }
        }
        Ok(None)
    }

    async fn backfill_vendor_id(
        &self,
        code: &str,
        found: &VendorVoucher,
    ) -> Result<(), AccessError> {
        let Some(vendor_id) = &found.id else {
            return Ok(());
        };
        match self.db.get_voucher_by_code(code).await {
            Ok(local) if local.vendor_id.is_none() => {
                self.db.set_voucher_vendor_id(&local.id, vendor_id).await?;
            }
            // A code the controller knows but we never tracked is fine.
            Ok(_) | Err(DatabaseError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
