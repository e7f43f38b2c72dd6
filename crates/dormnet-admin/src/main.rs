//! DormNet Admin CLI
//!
//! Operator tool for the accommodation Wi-Fi: resident device registry,
//! blocking, and voucher management backed by the GWN Cloud controller.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use dormnet_admin::access::{DeviceManager, VoucherManager};
use dormnet_admin::device_cmd::{self, DeviceAction};
use dormnet_admin::storage::Database;
use dormnet_admin::voucher_cmd::{self, VoucherAction};
use dormnet_admin::wifi_cmd::{self, WifiAction};
use dormnet_core::config;
use dormnet_gwn::GwnClient;

#[derive(Parser, Debug)]
#[command(name = "dormnet-admin")]
#[command(version, about = "DormNet admin - accommodation Wi-Fi management")]
struct Args {
    /// Database file path
    #[arg(long, env = "DORMNET_DB_PATH")]
    db_path: Option<PathBuf>,

    /// GWN Cloud API base URL
    #[arg(long, env = "DORMNET_GWN_BASE_URL")]
    gwn_base_url: Option<String>,

    /// GWN Cloud application ID
    #[arg(long, env = "DORMNET_GWN_APP_ID")]
    gwn_app_id: Option<String>,

    /// GWN Cloud application secret
    #[arg(long, env = "DORMNET_GWN_APP_SECRET")]
    gwn_app_secret: Option<String>,

    /// GWN Cloud network ID
    #[arg(long, env = "DORMNET_GWN_NETWORK_ID")]
    gwn_network_id: Option<String>,

    /// Log level filter (e.g. "info", "debug", "warn").
    #[arg(long, env = "DORMNET_LOG_LEVEL")]
    log_level: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "DORMNET_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Inspect the live Wi-Fi network.
    Wifi {
        #[command(subcommand)]
        action: WifiAction,
    },
    /// Manage the resident device registry.
    Devices {
        #[command(subcommand)]
        action: DeviceAction,
    },
    /// Issue and revoke Wi-Fi vouchers.
    Vouchers {
        #[command(subcommand)]
        action: VoucherAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Settings files first, then flag/env overrides.
    let mut config = config::load_config(None)?;
    if let Some(url) = args.gwn_base_url {
        config.gwn.base_url = url;
    }
    if let Some(id) = args.gwn_app_id {
        config.gwn.app_id = id;
    }
    if let Some(secret) = args.gwn_app_secret {
        config.gwn.app_secret = secret;
    }
    if let Some(network) = args.gwn_network_id {
        config.gwn.network_id = network;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    let log_filter = format!(
        "dormnet_admin={level},dormnet_gwn={level},dormnet_core={level}",
        level = config.log_level
    );
    dormnet_core::tracing_init::init_tracing(&log_filter, args.log_json);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting dormnet-admin");

    let gwn = GwnClient::new(config.gwn.clone())?;

    match args.command {
        Command::Wifi { action } => wifi_cmd::run(&gwn, action).await,
        Command::Devices { action } => {
            let db = open_database(args.db_path, &config).await?;
            let manager = DeviceManager::new(db, gwn);
            device_cmd::run(&manager, action).await
        }
        Command::Vouchers { action } => {
            let db = open_database(args.db_path, &config).await?;
            let manager = VoucherManager::new(db, gwn.clone());
            voucher_cmd::run(&manager, &gwn, &config, action).await
        }
    }
}

async fn open_database(
    flag: Option<PathBuf>,
    config: &dormnet_core::Config,
) -> anyhow::Result<Database> {
    let path = match flag.or_else(|| config.database.path.clone()) {
        Some(path) => path,
        None => default_db_path()?,
    };
    Ok(Database::open(&path).await?)
}

/// Default database path: ~/.dormnet/admin.db
fn default_db_path() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".dormnet").join("admin.db"))
}
