//! TCP transport helpers for the console listener.

use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

/// Create a TCP listener bound to the given address
pub async fn listen_tcp(addr: SocketAddr) -> tokio::io::Result<TcpListener> {
    TcpListener::bind(addr).await
}

/// Apply per-connection socket options to an accepted console connection.
/// Failures are logged and ignored; the session proceeds either way.
pub fn apply_socket_options(stream: &TcpStream) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("cannot set TCP_NODELAY on console socket: {}", e);
    }
}
