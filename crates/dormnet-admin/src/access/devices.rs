//! Device registration, blocking, and renaming.

use dormnet_gwn::GwnClient;
use dormnet_gwn::mac::normalize_mac;
use tracing::warn;

use super::{AccessError, VendorSync};
use crate::storage::{Database, Device};

/// Outcome of a block or unblock request.
#[derive(Debug)]
pub struct BlockOutcome {
    pub device: Device,
    pub vendor: VendorSync,
}

/// Local-first device workflows.
///
/// The local registry always reflects the operator's decision; the
/// controller is updated afterwards and failures surface in the outcome.
#[derive(Clone)]
pub struct DeviceManager {
    db: Database,
    gwn: GwnClient,
}

impl DeviceManager {
    pub const fn new(db: Database, gwn: GwnClient) -> Self {
        Self { db, gwn }
    }

    /// Register a device to a resident. Purely local, no controller call.
    pub async fn register_device(
        &self,
        mac: &str,
        owner: &str,
        name: Option<&str>,
    ) -> Result<Device, AccessError> {
        let mac = normalize_mac(mac).ok_or_else(|| AccessError::InvalidMac(mac.to_string()))?;
        Ok(self.db.upsert_device(&mac, owner, name).await?)
    }

    /// Block a device locally, then mirror the block to the controller.
    ///
    /// The local row is updated first so the registry reflects the decision
    /// even when the controller is unreachable.
    pub async fn block_device(
        &self,
        mac: &str,
        reason: Option<&str>,
        actor: Option<&str>,
    ) -> Result<BlockOutcome, AccessError> {
        self.set_blocked(mac, true, reason, actor).await
    }

    /// Unblock a device locally, then mirror the unblock to the controller.
    pub async fn unblock_device(
        &self,
        mac: &str,
        actor: Option<&str>,
    ) -> Result<BlockOutcome, AccessError> {
        self.set_blocked(mac, false, None, actor).await
    }

    async fn set_blocked(
        &self,
        mac: &str,
        blocked: bool,
        reason: Option<&str>,
        actor: Option<&str>,
    ) -> Result<BlockOutcome, AccessError> {
        let mac = normalize_mac(mac).ok_or_else(|| AccessError::InvalidMac(mac.to_string()))?;
        let device = self.db.set_device_blocked(&mac, blocked, reason, actor).await?;

        let vendor = match self.gwn.set_client_block_status(&mac, None, blocked).await {
            Ok(()) => VendorSync::Synced,
            Err(e) => {
                warn!(
                    mac = %mac,
                    blocked,
                    error = %e,
                    "Controller block update failed; local state stands"
                );
                VendorSync::Failed(e.to_string())
            }
        };

        Ok(BlockOutcome { device, vendor })
    }

    /// Rename a device. The controller rename is opportunistic: a failure
    /// is logged and otherwise ignored.
    pub async fn rename_device(&self, mac: &str, name: &str) -> Result<Device, AccessError> {
        let mac = normalize_mac(mac).ok_or_else(|| AccessError::InvalidMac(mac.to_string()))?;
        let device = self.db.set_device_name(&mac, name).await?;

        if let Err(e) = self.gwn.edit_client_name(&mac, name).await {
            warn!(mac = %mac, error = %e, "Controller rename failed; keeping local name");
        }

        Ok(device)
    }

    /// List registered devices, optionally for one owner.
    pub async fn list_devices(&self, owner: Option<&str>) -> Result<Vec<Device>, AccessError> {
        Ok(self.db.list_devices(owner).await?)
    }

    /// Fetch one device by MAC.
    pub async fn get_device(&self, mac: &str) -> Result<Device, AccessError> {
        let mac = normalize_mac(mac).ok_or_else(|| AccessError::InvalidMac(mac.to_string()))?;
        Ok(self.db.get_device(&mac).await?)
    }
}
