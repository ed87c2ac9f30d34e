//! Relay server binary.
//!
//! Boots the relay state, spawns the remote admin console on its private
//! thread, and then parks in the host loop. The relay machinery proper
//! (listeners, allocations, STUN/TURN state) hangs off this loop; the
//! console only reads its configuration and can command it to stop.

use clap::Parser;
use console_session::{control_bridge, ConsoleServer};
use console_state::RelayState;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::FileConfig;

/// Network relay server with an embedded telnet admin console
#[derive(Parser, Debug)]
#[command(name = "relay-console", version, about = "Network relay server with remote admin console")]
struct Args {
    /// Configuration file path
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Console listener address, e.g. 127.0.0.1
    #[arg(long)]
    cli_ip: Option<IpAddr>,

    /// Console listener port
    #[arg(long)]
    cli_port: Option<u16>,

    /// Console password; empty disables authentication
    #[arg(long)]
    cli_password: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::new("info")
        .add_directive(format!("relay_console={}", args.log_level).parse()?)
        .add_directive(format!("console_session={}", args.log_level).parse()?)
        .add_directive(format!("console_telnet={}", args.log_level).parse()?)
        .add_directive(format!("console_state={}", args.log_level).parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    info!("Starting relay server v{}", env!("CARGO_PKG_VERSION"));

    let file_config = FileConfig::load_from_file(&args.config)?;
    let console_config =
        file_config.console_config(args.cli_ip, args.cli_port, args.cli_password);

    let state = Arc::new(RelayState {
        config: file_config.relay,
        flags: file_config.toggles,
    });

    let (console_end, host_end) = control_bridge();

    if let Err(e) = ConsoleServer::spawn(console_config, state.clone(), console_end) {
        error!("cannot start console thread: {}", e);
    }

    // Host main loop. The relay engine lives here; the console can only
    // reach it through the control bridge, which the host keeps open for
    // the lifetime of the process.
    let _host_control = host_end;

    tokio::signal::ctrl_c().await?;
    info!("relay server stopped");
    Ok(())
}
