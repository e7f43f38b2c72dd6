//! DormNet Admin
//!
//! Management backend for the student-accommodation Wi-Fi portal: a local
//! `SQLite` registry of resident devices and vouchers, plus local-first
//! workflows that mirror changes to the GWN Cloud controller.

pub mod access;
pub mod device_cmd;
pub mod fmt;
pub mod storage;
pub mod voucher_cmd;
pub mod wifi_cmd;
