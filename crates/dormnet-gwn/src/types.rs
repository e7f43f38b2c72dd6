//! Typed views over normalized controller rows.
//!
//! Each type names its candidate keys explicitly; the controller renames
//! fields between firmware generations, so construction goes through
//! [`NormalizedRow`] accessors rather than serde aliases. Rows missing
//! their identifying field are dropped by the caller.

use serde::Serialize;

use crate::response::NormalizedRow;

/// A client device known to the controller.
#[derive(Debug, Clone, Serialize)]
pub struct WifiClient {
    pub mac: String,
    pub name: Option<String>,
    pub ip: Option<String>,
    pub ssid: Option<String>,
    pub blocked: bool,
    pub online: bool,
}

impl WifiClient {
    pub fn from_row(row: &NormalizedRow) -> Option<Self> {
        let mac = row.str_field(&["mac", "macAddress", "clientMac"])?;
        Some(Self {
            mac,
            name: row.str_field(&["name", "hostName", "deviceName"]),
            ip: row.str_field(&["ip", "ipAddress", "clientIp"]),
            ssid: row.str_field(&["ssid", "ssidName"]),
            blocked: row.bool_field(&["blocked", "isBlocked", "block"]).unwrap_or(false),
            online: row.bool_field(&["online", "isOnline"]).unwrap_or(false),
        })
    }
}

/// An access point in the managed network.
#[derive(Debug, Clone, Serialize)]
pub struct AccessPoint {
    pub mac: String,
    pub name: Option<String>,
    pub model: Option<String>,
    pub ip: Option<String>,
    pub online: bool,
    pub client_count: Option<i64>,
}

impl AccessPoint {
    pub fn from_row(row: &NormalizedRow) -> Option<Self> {
        let mac = row.str_field(&["mac", "apMac", "macAddress"])?;
        Some(Self {
            mac,
            name: row.str_field(&["name", "apName"]),
            model: row.str_field(&["model", "productName"]),
            ip: row.str_field(&["ip", "ipAddress"]),
            online: row.bool_field(&["online", "isOnline"]).unwrap_or(false),
            client_count: row.i64_field(&["clientCount", "clientNum"]),
        })
    }
}

/// A broadcast SSID.
#[derive(Debug, Clone, Serialize)]
pub struct Ssid {
    pub id: Option<String>,
    pub name: String,
    pub enabled: bool,
}

impl Ssid {
    pub fn from_row(row: &NormalizedRow) -> Option<Self> {
        let name = row.str_field(&["name", "ssidName", "ssid"])?;
        Some(Self {
            id: row.str_field(&["id", "ssidId"]),
            name,
            enabled: row.bool_field(&["enable", "enabled"]).unwrap_or(true),
        })
    }
}

/// Headline figures for the managed network.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub ap_count: Option<i64>,
    pub client_count: Option<i64>,
}

impl NetworkSummary {
    pub fn from_row(row: &NormalizedRow) -> Self {
        Self {
            id: row.str_field(&["id", "networkId"]),
            name: row.str_field(&["name", "networkName"]),
            ap_count: row.i64_field(&["apCount", "apNum"]),
            client_count: row.i64_field(&["clientCount", "clientNum"]),
        }
    }
}

/// A voucher group configured on the controller.
#[derive(Debug, Clone, Serialize)]
pub struct VoucherGroup {
    pub id: String,
    pub name: Option<String>,
    pub voucher_count: Option<i64>,
}

impl VoucherGroup {
    pub fn from_row(row: &NormalizedRow) -> Option<Self> {
        let id = row.str_field(&["id", "groupId"])?;
        Some(Self {
            id,
            name: row.str_field(&["name", "groupName"]),
            voucher_count: row.i64_field(&["voucherCount", "quantity", "count"]),
        })
    }
}

/// A voucher as the controller reports it.
#[derive(Debug, Clone, Serialize)]
pub struct VendorVoucher {
    pub id: Option<String>,
    pub code: String,
    pub status: Option<String>,
}

impl VendorVoucher {
    pub fn from_row(row: &NormalizedRow) -> Option<Self> {
        let code = row.str_field(&["code", "voucherCode", "password"])?;
        Some(Self {
            id: row.str_field(&["id", "voucherId"]),
            code,
            status: row.str_field(&["status", "state"]),
        })
    }
}

/// One page of a group's voucher listing.
///
/// `row_count` is how many rows the controller sent back, including rows
/// dropped for lacking a readable code. A page is only the last one when
/// `row_count` falls short of the requested page size.
#[derive(Debug, Clone)]
pub struct VoucherPage {
    pub vouchers: Vec<VendorVoucher>,
    pub row_count: usize,
}

/// Parameters for creating vouchers on the controller.
#[derive(Debug, Clone)]
pub struct GenerateVoucherRequest {
    pub group_id: String,
    pub quantity: u32,
    pub duration_days: u32,
    pub device_limit: u32,
    pub note: Option<String>,
}

/// The controller's answer to a voucher create: its row id plus the
/// generated code.
#[derive(Debug, Clone)]
pub struct IssuedVoucher {
    pub vendor_id: Option<String>,
    pub code: String,
}
