//! Output formatting helpers.

use std::io::{self, Write};

use dormnet_gwn::types::NetworkSummary;

use crate::storage::{Device, Voucher};

pub fn write_device_detail(w: &mut impl Write, device: &Device) -> io::Result<()> {
    writeln!(w, "  MAC:      {}", device.mac)?;
    writeln!(w, "  Owner:    {}", device.owner)?;
    if let Some(name) = &device.name {
        writeln!(w, "  Name:     {name}")?;
    }
    writeln!(w, "  Blocked:  {}", yes_no(device.is_blocked()))?;
    if let Some(reason) = &device.block_reason {
        writeln!(w, "  Reason:   {reason}")?;
    }
    if let Some(actor) = &device.blocked_by {
        writeln!(w, "  By:       {actor}")?;
    }
    Ok(())
}

pub fn write_voucher_detail(w: &mut impl Write, voucher: &Voucher) -> io::Result<()> {
    writeln!(w, "  Code:     {}", voucher.code)?;
    writeln!(w, "  Owner:    {}", voucher.owner)?;
    writeln!(w, "  Month:    {}", voucher.month)?;
    writeln!(w, "  Group:    {}", voucher.group_id)?;
    writeln!(w, "  Status:   {}", voucher.status)?;
    writeln!(w, "  Active:   {}", yes_no(voucher.is_active()))?;
    if let Some(vendor_id) = &voucher.vendor_id {
        writeln!(w, "  Vendor:   {vendor_id}")?;
    }
    Ok(())
}

pub fn write_network_detail(w: &mut impl Write, network: &NetworkSummary) -> io::Result<()> {
    writeln!(w, "  Network:  {}", or_dash(network.name.as_deref()))?;
    writeln!(w, "  ID:       {}", or_dash(network.id.as_deref()))?;
    if let Some(aps) = network.ap_count {
        writeln!(w, "  APs:      {aps}")?;
    }
    if let Some(clients) = network.client_count {
        writeln!(w, "  Clients:  {clients}")?;
    }
    Ok(())
}

pub const fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

/// Display-friendly fallback for optional fields in table rows.
pub fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max - 1).collect::<String>())
    }
}
