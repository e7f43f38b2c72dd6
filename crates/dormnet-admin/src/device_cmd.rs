//! Device registry subcommands.
//!
//! Block and unblock print a WARNING line when the controller could not be
//! updated; the local change stands either way.

use std::io::{self, Write};

use crate::access::{DeviceManager, VendorSync};
use crate::fmt::{or_dash, truncate, write_device_detail, yes_no};

/// Device subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum DeviceAction {
    /// List registered devices.
    List {
        /// Filter by owner (resident identifier).
        #[arg(short, long)]
        owner: Option<String>,
    },
    /// Register a device to a resident.
    Register {
        /// Device MAC address (any common separator style).
        mac: String,
        /// Owner (resident identifier).
        owner: String,
        /// Friendly device name.
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Block a device on the Wi-Fi network.
    Block {
        /// Device MAC address.
        mac: String,
        /// Reason recorded with the block.
        #[arg(short, long)]
        reason: Option<String>,
        /// Operator performing the block.
        #[arg(long)]
        actor: Option<String>,
    },
    /// Unblock a device.
    Unblock {
        /// Device MAC address.
        mac: String,
        /// Operator performing the unblock.
        #[arg(long)]
        actor: Option<String>,
    },
    /// Rename a device.
    Rename {
        /// Device MAC address.
        mac: String,
        /// New device name.
        name: String,
    },
    /// Show one device.
    Show {
        /// Device MAC address.
        mac: String,
    },
}

/// Execute a devices subcommand.
pub async fn run(manager: &DeviceManager, action: DeviceAction) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        DeviceAction::List { owner } => {
            let devices = manager.list_devices(owner.as_deref()).await?;
            if devices.is_empty() {
                writeln!(out, "No devices registered.")?;
            } else {
                writeln!(
                    out,
                    "{:<17} {:<16} {:<20} {:<7}",
                    "MAC", "OWNER", "NAME", "BLOCKED"
                )?;
                for d in &devices {
                    writeln!(
                        out,
                        "{:<17} {:<16} {:<20} {:<7}",
                        d.mac,
                        truncate(&d.owner, 16),
                        truncate(or_dash(d.name.as_deref()), 20),
                        yes_no(d.is_blocked()),
                    )?;
                }
                writeln!(out, "\n{} device(s)", devices.len())?;
            }
        }
        DeviceAction::Register { mac, owner, name } => {
            let device = manager
                .register_device(&mac, &owner, name.as_deref())
                .await?;
            writeln!(out, "Device {} registered to {}.", device.mac, device.owner)?;
        }
        DeviceAction::Block { mac, reason, actor } => {
            let outcome = manager
                .block_device(&mac, reason.as_deref(), actor.as_deref())
                .await?;
            writeln!(out, "Device {} blocked.", outcome.device.mac)?;
            warn_if_unsynced(&mut out, &outcome.vendor)?;
        }
        DeviceAction::Unblock { mac, actor } => {
            let outcome = manager.unblock_device(&mac, actor.as_deref()).await?;
            writeln!(out, "Device {} unblocked.", outcome.device.mac)?;
            warn_if_unsynced(&mut out, &outcome.vendor)?;
        }
        DeviceAction::Rename { mac, name } => {
            let device = manager.rename_device(&mac, &name).await?;
            writeln!(
                out,
                "Device {} renamed to {}.",
                device.mac,
                or_dash(device.name.as_deref())
            )?;
        }
        DeviceAction::Show { mac } => {
            let device = manager.get_device(&mac).await?;
            write_device_detail(&mut out, &device)?;
        }
    }
    Ok(())
}

fn warn_if_unsynced(out: &mut impl Write, vendor: &VendorSync) -> io::Result<()> {
    if let VendorSync::Failed(e) = vendor {
        writeln!(out, "WARNING: controller not updated: {e}")?;
    }
    Ok(())
}
