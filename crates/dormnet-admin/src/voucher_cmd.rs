//! Voucher subcommands.

use std::io::{self, Write};

use anyhow::Context;
use dormnet_core::Config;
use dormnet_gwn::GwnClient;

use crate::access::{VendorSync, VoucherManager};
use crate::fmt::{or_dash, truncate, write_voucher_detail, yes_no};
use crate::storage::VoucherStatus;

/// Voucher subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum VoucherAction {
    /// Issue a voucher for a resident's billing month.
    Issue {
        /// Owner (resident identifier).
        owner: String,
        /// Billing month (YYYY-MM).
        month: String,
        /// Voucher group ID (defaults to the configured group).
        #[arg(short, long)]
        group: Option<String>,
        /// Validity in days (defaults to the configured duration).
        #[arg(long)]
        days: Option<u32>,
        /// Concurrent device limit (defaults to the configured limit).
        #[arg(long)]
        device_limit: Option<u32>,
        /// Note attached to the controller-side voucher.
        #[arg(long)]
        note: Option<String>,
    },
    /// Revoke a voucher by code.
    Revoke {
        /// Voucher code.
        code: String,
        /// Operator performing the revoke.
        #[arg(long)]
        actor: Option<String>,
    },
    /// List locally tracked vouchers.
    List {
        /// Filter by owner.
        #[arg(short, long)]
        owner: Option<String>,
        /// Filter by billing month (YYYY-MM).
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Show one voucher by code.
    Show {
        /// Voucher code.
        code: String,
    },
    /// Update the delivery status of a voucher.
    Mark {
        /// Voucher code.
        code: String,
        /// New status.
        #[arg(value_parser = ["unused", "sent", "failed"])]
        status: String,
    },
    /// List the controller's voucher groups.
    Groups,
    /// List controller-side vouchers in a group.
    Remote {
        /// Voucher group ID (defaults to the configured group).
        #[arg(short, long)]
        group: Option<String>,
        /// Page number (1-based).
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Results per page.
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// Find a code in the controller's listing.
    Locate {
        /// Voucher code.
        code: String,
        /// Voucher group ID (defaults to the configured group).
        #[arg(short, long)]
        group: Option<String>,
    },
}

/// Execute a vouchers subcommand.
pub async fn run(
    manager: &VoucherManager,
    gwn: &GwnClient,
    config: &Config,
    action: VoucherAction,
) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        VoucherAction::Issue {
            owner,
            month,
            group,
            days,
            device_limit,
            note,
        } => {
            let group = resolve_group(group, config)?;
            let days = days.unwrap_or(config.vouchers.duration_days);
            let device_limit = device_limit.unwrap_or(config.vouchers.device_limit);

            let voucher = manager
                .issue_voucher(&owner, &month, &group, days, device_limit, note)
                .await?;
            writeln!(out, "Voucher {} issued to {}.", voucher.code, voucher.owner)?;
        }
        VoucherAction::Revoke { code, actor } => {
            let outcome = manager.revoke_voucher(&code, actor.as_deref()).await?;
            writeln!(out, "Voucher {} revoked.", outcome.voucher.code)?;
            if let VendorSync::Failed(e) = &outcome.vendor {
                writeln!(out, "WARNING: controller not updated: {e}")?;
            }
        }
        VoucherAction::List { owner, month } => {
            let vouchers = manager
                .list_vouchers(owner.as_deref(), month.as_deref())
                .await?;
            if vouchers.is_empty() {
                writeln!(out, "No vouchers found.")?;
            } else {
                writeln!(
                    out,
                    "{:<14} {:<16} {:<8} {:<8} {:<7}",
                    "CODE", "OWNER", "MONTH", "STATUS", "ACTIVE"
                )?;
                for v in &vouchers {
                    writeln!(
                        out,
                        "{:<14} {:<16} {:<8} {:<8} {:<7}",
                        v.code,
                        truncate(&v.owner, 16),
                        v.month,
                        v.status,
                        yes_no(v.is_active()),
                    )?;
                }
                writeln!(out, "\n{} voucher(s)", vouchers.len())?;
            }
        }
        VoucherAction::Show { code } => {
            let voucher = manager.find_voucher(&code).await?;
            write_voucher_detail(&mut out, &voucher)?;
        }
        VoucherAction::Mark { code, status } => {
            let status = parse_status(&status)?;
            let voucher = manager.set_status(&code, status).await?;
            writeln!(out, "Voucher {} marked {}.", voucher.code, voucher.status)?;
        }
        VoucherAction::Groups => {
            let groups = gwn
                .list_voucher_groups(1, 100)
                .await
                .context("GWN Cloud API unavailable")?;
            if groups.is_empty() {
                writeln!(out, "No voucher groups found.")?;
            } else {
                writeln!(out, "{:<20} {:<24} {:<8}", "ID", "NAME", "VOUCHERS")?;
                for g in &groups {
                    writeln!(
                        out,
                        "{:<20} {:<24} {:<8}",
                        g.id,
                        truncate(or_dash(g.name.as_deref()), 24),
                        g.voucher_count.unwrap_or(0),
                    )?;
                }
                writeln!(out, "\n{} group(s)", groups.len())?;
            }
        }
        VoucherAction::Remote {
            group,
            page,
            page_size,
        } => {
            let group = resolve_group(group, config)?;
            let batch = gwn
                .get_group_vouchers(&group, page, page_size)
                .await
                .context("GWN Cloud API unavailable")?;
            if batch.vouchers.is_empty() {
                writeln!(out, "No vouchers found.")?;
            } else {
                writeln!(out, "{:<14} {:<20} {:<10}", "CODE", "ID", "STATUS")?;
                for v in &batch.vouchers {
                    writeln!(
                        out,
                        "{:<14} {:<20} {:<10}",
                        v.code,
                        or_dash(v.id.as_deref()),
                        or_dash(v.status.as_deref()),
                    )?;
                }
                writeln!(out, "\n{} voucher(s)", batch.vouchers.len())?;
            }
        }
        VoucherAction::Locate { code, group } => {
            let group = resolve_group(group, config)?;
            match manager.locate_vendor_voucher(&group, &code).await? {
                Some(found) => {
                    writeln!(out, "  Code:     {}", found.code)?;
                    writeln!(out, "  ID:       {}", or_dash(found.id.as_deref()))?;
                    writeln!(out, "  Status:   {}", or_dash(found.status.as_deref()))?;
                }
                None => writeln!(out, "Code {code} not found in group {group}.")?,
            }
        }
    }
    Ok(())
}

/// Use the configured voucher group when no flag was given.
fn resolve_group(flag: Option<String>, config: &Config) -> anyhow::Result<String> {
    match flag {
        Some(group) => Ok(group),
        None if !config.vouchers.group_id.is_empty() => Ok(config.vouchers.group_id.clone()),
        None => anyhow::bail!("no voucher group configured; pass --group or set vouchers.group_id"),
    }
}

fn parse_status(s: &str) -> anyhow::Result<VoucherStatus> {
    match s {
        "unused" => Ok(VoucherStatus::Unused),
        "sent" => Ok(VoucherStatus::Sent),
        "failed" => Ok(VoucherStatus::Failed),
        other => anyhow::bail!("unknown voucher status: {other}"),
    }
}
