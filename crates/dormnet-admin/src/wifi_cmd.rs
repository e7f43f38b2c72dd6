//! Wi-Fi subcommands: live views of the controller's clients, APs, and SSIDs.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use anyhow::Context;
use dormnet_gwn::{GwnClient, GwnError};

use crate::fmt::{or_dash, truncate, write_network_detail, yes_no};

const ALL_PAGE_SIZE: u32 = 100;
/// Safety cap for `--all` so a controller that keeps returning full pages
/// cannot loop us forever.
const ALL_PAGE_LIMIT: u32 = 100;

/// Wi-Fi subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum WifiAction {
    /// List clients the controller currently knows.
    Clients {
        /// Page number (1-based).
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Results per page.
        #[arg(long, default_value_t = 20)]
        page_size: u32,
        /// Fetch every page.
        #[arg(long)]
        all: bool,
    },
    /// List access points.
    Aps {
        /// Page number (1-based).
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Results per page.
        #[arg(long, default_value_t = 20)]
        page_size: u32,
        /// Fetch every page.
        #[arg(long)]
        all: bool,
    },
    /// List SSIDs.
    Ssids {
        /// Page number (1-based).
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Results per page.
        #[arg(long, default_value_t = 20)]
        page_size: u32,
        /// Fetch every page.
        #[arg(long)]
        all: bool,
    },
    /// Show a summary of the managed network.
    Network,
}

/// Execute a wifi subcommand.
pub async fn run(gwn: &GwnClient, action: WifiAction) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        WifiAction::Clients {
            page,
            page_size,
            all,
        } => {
            let clients = if all {
                fetch_all(|page| gwn.list_clients(page, ALL_PAGE_SIZE)).await
            } else {
                gwn.list_clients(page, page_size).await
            }
            .context("GWN Cloud API unavailable")?;

            if clients.is_empty() {
                writeln!(out, "No clients found.")?;
            } else {
                writeln!(
                    out,
                    "{:<17} {:<20} {:<15} {:<16} {:<7} {:<6}",
                    "MAC", "NAME", "IP", "SSID", "BLOCKED", "ONLINE"
                )?;
                for c in &clients {
                    writeln!(
                        out,
                        "{:<17} {:<20} {:<15} {:<16} {:<7} {:<6}",
                        c.mac,
                        truncate(or_dash(c.name.as_deref()), 20),
                        or_dash(c.ip.as_deref()),
                        truncate(or_dash(c.ssid.as_deref()), 16),
                        yes_no(c.blocked),
                        yes_no(c.online),
                    )?;
                }
                writeln!(out, "\n{} client(s)", clients.len())?;
            }
        }
        WifiAction::Aps {
            page,
            page_size,
            all,
        } => {
            let aps = if all {
                fetch_all(|page| gwn.list_access_points(page, ALL_PAGE_SIZE)).await
            } else {
                gwn.list_access_points(page, page_size).await
            }
            .context("GWN Cloud API unavailable")?;

            if aps.is_empty() {
                writeln!(out, "No access points found.")?;
            } else {
                writeln!(
                    out,
                    "{:<17} {:<20} {:<16} {:<15} {:<6} {:<7}",
                    "MAC", "NAME", "MODEL", "IP", "ONLINE", "CLIENTS"
                )?;
                for ap in &aps {
                    writeln!(
                        out,
                        "{:<17} {:<20} {:<16} {:<15} {:<6} {:<7}",
                        ap.mac,
                        truncate(or_dash(ap.name.as_deref()), 20),
                        or_dash(ap.model.as_deref()),
                        or_dash(ap.ip.as_deref()),
                        yes_no(ap.online),
                        ap.client_count.unwrap_or(0),
                    )?;
                }
                writeln!(out, "\n{} access point(s)", aps.len())?;
            }
        }
        WifiAction::Ssids {
            page,
            page_size,
            all,
        } => {
            let ssids = if all {
                fetch_all(|page| gwn.list_ssids(page, ALL_PAGE_SIZE)).await
            } else {
                gwn.list_ssids(page, page_size).await
            }
            .context("GWN Cloud API unavailable")?;

            if ssids.is_empty() {
                writeln!(out, "No SSIDs found.")?;
            } else {
                writeln!(out, "{:<24} {:<8} {:<20}", "NAME", "ENABLED", "ID")?;
                for ssid in &ssids {
                    writeln!(
                        out,
                        "{:<24} {:<8} {:<20}",
                        truncate(&ssid.name, 24),
                        yes_no(ssid.enabled),
                        or_dash(ssid.id.as_deref()),
                    )?;
                }
                writeln!(out, "\n{} SSID(s)", ssids.len())?;
            }
        }
        WifiAction::Network => {
            let network = gwn
                .network_detail()
                .await
                .context("GWN Cloud API unavailable")?;
            write_network_detail(&mut out, &network)?;
        }
    }
    Ok(())
}

/// Page through a listing until a short page signals the end.
async fn fetch_all<T, F, Fut>(fetch: F) -> Result<Vec<T>, GwnError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, GwnError>>,
{
    let mut rows = Vec::new();
    for page in 1..=ALL_PAGE_LIMIT {
        let mut batch = fetch(page).await?;
        let done = batch.len() < ALL_PAGE_SIZE as usize;
        rows.append(&mut batch);
        if done {
            break;
        }
    }
    Ok(rows)
}
