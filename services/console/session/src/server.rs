//! Console acceptor and the private event loop it runs on.
//!
//! The console binds one TCP endpoint and serves sessions plus the bridge
//! drain on a dedicated `current_thread` runtime inside its own OS thread.
//! A listener setup failure is fatal only to the console subsystem; the
//! host relay keeps running without remote administration.

use crate::bridge::drain_control;
use crate::session::{ConsoleSession, SessionOutcome};
use crate::transport::listen_tcp;
use anyhow::Context;
use console_state::RelayState;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::io::DuplexStream;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Default bind address for the console listener.
pub const CONSOLE_DEFAULT_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
/// Default TCP port for the console listener.
pub const CONSOLE_DEFAULT_PORT: u16 = 5766;

/// Console subsystem configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Address the listener binds
    pub bind_ip: IpAddr,
    /// Port the listener binds
    pub port: u16,
    /// Shared secret; `None` or empty disables authentication
    pub password: Option<String>,
    /// Chatty connect/disconnect logging
    pub verbose: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            bind_ip: CONSOLE_DEFAULT_IP,
            port: CONSOLE_DEFAULT_PORT,
            password: None,
            verbose: false,
        }
    }
}

/// The console subsystem: one listener, one private loop, process
/// lifetime. Initialized once at startup, no explicit teardown.
pub struct ConsoleServer;

impl ConsoleServer {
    /// Start the console on its own thread with a `current_thread`
    /// runtime. Returns the thread handle; any failure inside the console
    /// (bind, listen, accept loop) is logged there and never propagates to
    /// the host.
    pub fn spawn(
        config: ConsoleConfig,
        state: Arc<RelayState>,
        bridge: DuplexStream,
    ) -> std::io::Result<std::thread::JoinHandle<()>> {
        std::thread::Builder::new()
            .name("console".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_io()
                    .enable_time()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("cannot build console runtime: {}", e);
                        return;
                    }
                };

                runtime.block_on(async move {
                    if let Err(e) = run_console(config, state, bridge).await {
                        error!("console subsystem failed: {:#}", e);
                    }
                });
            })
    }
}

/// Bind the configured endpoint and serve until the process exits.
async fn run_console(
    config: ConsoleConfig,
    state: Arc<RelayState>,
    bridge: DuplexStream,
) -> anyhow::Result<()> {
    let addr = SocketAddr::new(config.bind_ip, config.port);
    let listener = listen_tcp(addr)
        .await
        .with_context(|| format!("cannot bind console listener on {}", addr))?;
    info!(addr = %listener.local_addr()?, "console listener opened");

    tokio::spawn(async move {
        drain_control(bridge).await;
        debug!("console bridge closed");
    });

    serve(listener, config, state).await
}

/// Accept console connections on an already-bound listener.
///
/// Sessions are independent tasks on the console loop; a shutdown command
/// from any session terminates the whole process with a success status
/// after that session's resources are released.
pub async fn serve(
    listener: TcpListener,
    config: ConsoleConfig,
    state: Arc<RelayState>,
) -> anyhow::Result<()> {
    let config = Arc::new(config);

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("console accept error: {}", e);
                continue;
            }
        };

        if config.verbose {
            info!(%peer, "console connected");
        } else {
            debug!(%peer, "console connected");
        }

        let session = ConsoleSession::new(config.clone(), state.clone(), stream, peer);
        tokio::spawn(async move {
            match session.run().await {
                Ok(SessionOutcome::Closed) => {}
                Ok(SessionOutcome::ShutdownRequested) => {
                    info!(%peer, "relay server shutting down on console command");
                    std::process::exit(0);
                }
                Err(e) => {
                    debug!(%peer, "console session ended: {:#}", e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::time::timeout;

    async fn start_server(config: ConsoleConfig) -> SocketAddr {
        let listener = listen_tcp(SocketAddr::new(CONSOLE_DEFAULT_IP, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(RelayState::default());
        tokio::spawn(serve(listener, config, state));
        addr
    }

    async fn read_until(client: &mut TcpStream, needle: &str) -> String {
        let mut collected = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            if String::from_utf8_lossy(&collected).contains(needle) {
                return String::from_utf8_lossy(&collected).into_owned();
            }
            let n = timeout(Duration::from_secs(2), client.read(&mut chunk))
                .await
                .expect("timed out waiting for console output")
                .unwrap();
            assert!(n > 0, "connection closed while waiting for {:?}", needle);
            collected.extend_from_slice(&chunk[..n]);
        }
    }

    #[tokio::test]
    async fn test_acceptor_serves_multiple_sessions() {
        let addr = start_server(ConsoleConfig::default()).await;

        let mut first = TcpStream::connect(addr).await.unwrap();
        let mut second = TcpStream::connect(addr).await.unwrap();

        read_until(&mut first, "> ").await;
        read_until(&mut second, "> ").await;

        // Sessions are independent: closing one leaves the other usable
        first.write_all(b"quit\r\n").await.unwrap();
        second.write_all(b"pc\r\n").await.unwrap();
        read_until(&mut second, "(Note:").await;
    }

    #[tokio::test]
    async fn test_acceptor_applies_password_config() {
        let addr = start_server(ConsoleConfig {
            password: Some("secret".into()),
            ..ConsoleConfig::default()
        })
        .await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        read_until(&mut client, "Enter password: ").await;
    }

    #[tokio::test]
    async fn test_listener_setup_failure_is_contained() {
        // Occupy a port, then ask the console to bind it
        let occupied = listen_tcp(SocketAddr::new(CONSOLE_DEFAULT_IP, 0)).await.unwrap();
        let addr = occupied.local_addr().unwrap();

        let state = Arc::new(RelayState::default());
        let (console_end, _host_end) = crate::bridge::control_bridge();
        let config = ConsoleConfig {
            bind_ip: addr.ip(),
            port: addr.port(),
            ..ConsoleConfig::default()
        };

        let result = run_console(config, state, console_end).await;
        assert!(result.is_err());
    }
}
