//! Database queries for DormNet admin.

use dormnet_core::db::unix_timestamp;

use super::db::{Database, DatabaseError};
use super::models::{Device, Voucher, VoucherStatus};

/// Parameters for inserting a freshly issued voucher.
#[derive(Debug)]
pub struct NewVoucher<'a> {
    pub id: &'a str,
    pub code: &'a str,
    pub vendor_id: Option<&'a str>,
    pub owner: &'a str,
    pub month: &'a str,
    pub group_id: &'a str,
    pub status: VoucherStatus,
}

impl Database {
    // =========================================================================
    // Device queries
    // =========================================================================

    /// Register a device, or update its owner and name if the MAC is
    /// already known.
    pub async fn upsert_device(
        &self,
        mac: &str,
        owner: &str,
        name: Option<&str>,
    ) -> Result<Device, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO devices (mac, owner, name, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(mac) DO UPDATE SET owner = ?, name = ?, updated_at = ?",
        )
        .bind(mac)
        .bind(owner)
        .bind(name)
        .bind(now)
        .bind(now)
        .bind(owner)
        .bind(name)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_device(mac).await
    }

    /// Get a device by MAC address.
    pub async fn get_device(&self, mac: &str) -> Result<Device, DatabaseError> {
        sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE mac = ?")
            .bind(mac)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Device {mac}")))
    }

    /// List devices, optionally filtered by owner.
    pub async fn list_devices(&self, owner: Option<&str>) -> Result<Vec<Device>, DatabaseError> {
        let devices = sqlx::query_as::<_, Device>(
            "SELECT * FROM devices WHERE (?1 IS NULL OR owner = ?1) ORDER BY created_at, mac",
        )
        .bind(owner)
        .fetch_all(self.pool())
        .await?;

        Ok(devices)
    }

    /// Set the block state of a device, recording who blocked it and why.
    /// Unblocking clears the reason, timestamp, and actor.
    pub async fn set_device_blocked(
        &self,
        mac: &str,
        blocked: bool,
        reason: Option<&str>,
        actor: Option<&str>,
    ) -> Result<Device, DatabaseError> {
        let now = unix_timestamp();
        let blocked_at = blocked.then_some(now);
        let reason = if blocked { reason } else { None };
        let actor = if blocked { actor } else { None };

        let result = sqlx::query(
            "UPDATE devices SET blocked = ?, block_reason = ?, blocked_at = ?, blocked_by = ?, updated_at = ? WHERE mac = ?",
        )
        .bind(i64::from(blocked))
        .bind(reason)
        .bind(blocked_at)
        .bind(actor)
        .bind(now)
        .bind(mac)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Device {mac}")));
        }
        self.get_device(mac).await
    }

    /// Rename a device.
    pub async fn set_device_name(&self, mac: &str, name: &str) -> Result<Device, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query("UPDATE devices SET name = ?, updated_at = ? WHERE mac = ?")
            .bind(name)
            .bind(now)
            .bind(mac)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Device {mac}")));
        }
        self.get_device(mac).await
    }

    // =========================================================================
    // Voucher queries
    // =========================================================================

    /// Insert a freshly issued voucher.
    pub async fn insert_voucher(&self, voucher: &NewVoucher<'_>) -> Result<Voucher, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            r"
            INSERT INTO vouchers (id, code, vendor_id, owner, month, group_id, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(voucher.id)
        .bind(voucher.code)
        .bind(voucher.vendor_id)
        .bind(voucher.owner)
        .bind(voucher.month)
        .bind(voucher.group_id)
        .bind(voucher.status.as_str())
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_voucher(voucher.id).await
    }

    /// Get a voucher by ID.
    pub async fn get_voucher(&self, id: &str) -> Result<Voucher, DatabaseError> {
        sqlx::query_as::<_, Voucher>("SELECT * FROM vouchers WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Voucher {id}")))
    }

    /// Get a voucher by its code.
    pub async fn get_voucher_by_code(&self, code: &str) -> Result<Voucher, DatabaseError> {
        sqlx::query_as::<_, Voucher>("SELECT * FROM vouchers WHERE code = ?")
            .bind(code)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Voucher code {code}")))
    }

    /// List vouchers, optionally filtered by owner and/or month.
    pub async fn list_vouchers(
        &self,
        owner: Option<&str>,
        month: Option<&str>,
    ) -> Result<Vec<Voucher>, DatabaseError> {
        let vouchers = sqlx::query_as::<_, Voucher>(
            "SELECT * FROM vouchers \
             WHERE (?1 IS NULL OR owner = ?1) AND (?2 IS NULL OR month = ?2) \
             ORDER BY created_at, code",
        )
        .bind(owner)
        .bind(month)
        .fetch_all(self.pool())
        .await?;

        Ok(vouchers)
    }

    /// Mark a voucher revoked, recording when and by whom.
    pub async fn mark_voucher_revoked(
        &self,
        id: &str,
        actor: Option<&str>,
    ) -> Result<Voucher, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "UPDATE vouchers SET active = 0, revoked_at = ?, revoked_by = ? WHERE id = ?",
        )
        .bind(now)
        .bind(actor)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Voucher {id}")));
        }
        self.get_voucher(id).await
    }

    /// Update the delivery status of a voucher.
    pub async fn set_voucher_status(
        &self,
        id: &str,
        status: VoucherStatus,
    ) -> Result<Voucher, DatabaseError> {
        let result = sqlx::query("UPDATE vouchers SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Voucher {id}")));
        }
        self.get_voucher(id).await
    }

    /// Backfill the controller-side ID of a voucher once it is known.
    pub async fn set_voucher_vendor_id(
        &self,
        id: &str,
        vendor_id: &str,
    ) -> Result<Voucher, DatabaseError> {
        let result = sqlx::query("UPDATE vouchers SET vendor_id = ? WHERE id = ?")
            .bind(vendor_id)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Voucher {id}")));
        }
        self.get_voucher(id).await
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn voucher<'a>(id: &'a str, code: &'a str, owner: &'a str) -> NewVoucher<'a> {
        NewVoucher {
            id,
            code,
            vendor_id: Some("v-1"),
            owner,
            month: "2026-09",
            group_id: "grp-1",
            status: VoucherStatus::Sent,
        }
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let db = test_db().await;

        let device = db
            .upsert_device("AA:BB:CC:DD:EE:FF", "resident-1", Some("laptop"))
            .await
            .unwrap();
        assert_eq!(device.mac, "AA:BB:CC:DD:EE:FF");
        assert_eq!(device.owner, "resident-1");
        assert_eq!(device.name.as_deref(), Some("laptop"));
        assert!(!device.is_blocked());

        let fetched = db.get_device("AA:BB:CC:DD:EE:FF").await.unwrap();
        assert_eq!(fetched.created_at, device.created_at);
    }

    #[tokio::test]
    async fn upsert_existing_updates_owner_and_name() {
        let db = test_db().await;

        db.upsert_device("AA:BB:CC:DD:EE:FF", "resident-1", Some("laptop"))
            .await
            .unwrap();
        let updated = db
            .upsert_device("AA:BB:CC:DD:EE:FF", "resident-2", Some("phone"))
            .await
            .unwrap();

        assert_eq!(updated.owner, "resident-2");
        assert_eq!(updated.name.as_deref(), Some("phone"));

        let all = db.list_devices(None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn get_missing_device_is_not_found() {
        let db = test_db().await;

        let err = db.get_device("00:00:00:00:00:01").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn block_records_reason_and_actor() {
        let db = test_db().await;
        db.upsert_device("AA:BB:CC:DD:EE:FF", "resident-1", None)
            .await
            .unwrap();

        let device = db
            .set_device_blocked("AA:BB:CC:DD:EE:FF", true, Some("unpaid"), Some("warden"))
            .await
            .unwrap();

        assert!(device.is_blocked());
        assert_eq!(device.block_reason.as_deref(), Some("unpaid"));
        assert_eq!(device.blocked_by.as_deref(), Some("warden"));
        assert!(device.blocked_at.is_some());
    }

    #[tokio::test]
    async fn unblock_clears_block_fields() {
        let db = test_db().await;
        db.upsert_device("AA:BB:CC:DD:EE:FF", "resident-1", None)
            .await
            .unwrap();
        db.set_device_blocked("AA:BB:CC:DD:EE:FF", true, Some("unpaid"), Some("warden"))
            .await
            .unwrap();

        let device = db
            .set_device_blocked("AA:BB:CC:DD:EE:FF", false, None, None)
            .await
            .unwrap();

        assert!(!device.is_blocked());
        assert!(device.block_reason.is_none());
        assert!(device.blocked_at.is_none());
        assert!(device.blocked_by.is_none());
    }

    #[tokio::test]
    async fn block_unknown_mac_is_not_found() {
        let db = test_db().await;

        let err = db
            .set_device_blocked("AA:BB:CC:DD:EE:FF", true, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn rename_updates_name() {
        let db = test_db().await;
        db.upsert_device("AA:BB:CC:DD:EE:FF", "resident-1", Some("old"))
            .await
            .unwrap();

        let device = db
            .set_device_name("AA:BB:CC:DD:EE:FF", "new")
            .await
            .unwrap();
        assert_eq!(device.name.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn list_devices_filters_by_owner() {
        let db = test_db().await;
        db.upsert_device("AA:BB:CC:DD:EE:01", "alice", None)
            .await
            .unwrap();
        db.upsert_device("AA:BB:CC:DD:EE:02", "bob", None)
            .await
            .unwrap();
        db.upsert_device("AA:BB:CC:DD:EE:03", "alice", None)
            .await
            .unwrap();

        let alice = db.list_devices(Some("alice")).await.unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|d| d.owner == "alice"));

        let all = db.list_devices(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn insert_voucher_then_fetch_by_code() {
        let db = test_db().await;

        let inserted = db
            .insert_voucher(&voucher("id-1", "CODE01", "alice"))
            .await
            .unwrap();
        assert_eq!(inserted.status, "sent");
        assert!(inserted.is_active());

        let fetched = db.get_voucher_by_code("CODE01").await.unwrap();
        assert_eq!(fetched.id, "id-1");
        assert_eq!(fetched.vendor_id.as_deref(), Some("v-1"));
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let db = test_db().await;

        db.insert_voucher(&voucher("id-1", "CODE01", "alice"))
            .await
            .unwrap();
        let err = db
            .insert_voucher(&voucher("id-2", "CODE01", "bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Query(_)));
    }

    #[tokio::test]
    async fn list_vouchers_filters_by_owner_and_month() {
        let db = test_db().await;
        db.insert_voucher(&voucher("id-1", "CODE01", "alice"))
            .await
            .unwrap();
        db.insert_voucher(&voucher("id-2", "CODE02", "bob"))
            .await
            .unwrap();
        db.insert_voucher(&NewVoucher {
            month: "2026-10",
            ..voucher("id-3", "CODE03", "alice")
        })
        .await
        .unwrap();

        let alice = db.list_vouchers(Some("alice"), None).await.unwrap();
        assert_eq!(alice.len(), 2);

        let alice_sept = db
            .list_vouchers(Some("alice"), Some("2026-09"))
            .await
            .unwrap();
        assert_eq!(alice_sept.len(), 1);
        assert_eq!(alice_sept[0].code, "CODE01");

        let all = db.list_vouchers(None, None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn revoke_sets_fields() {
        let db = test_db().await;
        db.insert_voucher(&voucher("id-1", "CODE01", "alice"))
            .await
            .unwrap();

        let revoked = db
            .mark_voucher_revoked("id-1", Some("warden"))
            .await
            .unwrap();
        assert!(!revoked.is_active());
        assert!(revoked.revoked_at.is_some());
        assert_eq!(revoked.revoked_by.as_deref(), Some("warden"));
    }

    #[tokio::test]
    async fn set_status_updates() {
        let db = test_db().await;
        db.insert_voucher(&NewVoucher {
            status: VoucherStatus::Unused,
            ..voucher("id-1", "CODE01", "alice")
        })
        .await
        .unwrap();

        let updated = db
            .set_voucher_status("id-1", VoucherStatus::Failed)
            .await
            .unwrap();
        assert_eq!(updated.status, "failed");
    }

    #[tokio::test]
    async fn vendor_id_backfill() {
        let db = test_db().await;
        db.insert_voucher(&NewVoucher {
            vendor_id: None,
            ..voucher("id-1", "CODE01", "alice")
        })
        .await
        .unwrap();

        let updated = db.set_voucher_vendor_id("id-1", "v-99").await.unwrap();
        assert_eq!(updated.vendor_id.as_deref(), Some("v-99"));
    }
}
