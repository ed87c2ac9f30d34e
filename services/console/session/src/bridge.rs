//! Control-plane bridge between the console loop and the host thread.
//!
//! A duplex in-memory byte pipe with one endpoint owned by the console's
//! event loop and the other by the host server's thread; the transport
//! itself serializes cross-thread delivery, so neither side locks shared
//! state. Traffic is fixed-size [`ControlMessage`] records. The payload is
//! an opaque placeholder for future bidirectional control commands; the
//! console side only guarantees drain-and-discard without ever blocking
//! its loop, and a malformed trailing fragment cannot corrupt later reads.

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tracing::{trace, warn};

/// Fixed size of one control-message record on the bridge.
pub const CONTROL_MESSAGE_SIZE: usize = 64;

/// One opaque control record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlMessage(pub [u8; CONTROL_MESSAGE_SIZE]);

impl ControlMessage {
    /// An all-zero record
    pub fn zeroed() -> Self {
        Self([0u8; CONTROL_MESSAGE_SIZE])
    }

    /// The record's raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for ControlMessage {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Create the bridge pair: (console endpoint, host endpoint).
pub fn control_bridge() -> (DuplexStream, DuplexStream) {
    tokio::io::duplex(64 * CONTROL_MESSAGE_SIZE)
}

/// Write one record to the bridge from the host side.
pub async fn send_control(
    endpoint: &mut DuplexStream,
    message: &ControlMessage,
) -> tokio::io::Result<()> {
    endpoint.write_all(message.as_bytes()).await
}

/// Drain the console endpoint one whole record at a time until the host
/// side closes. Returns the number of records consumed.
///
/// A trailing fragment shorter than [`CONTROL_MESSAGE_SIZE`] is a protocol
/// anomaly: logged and discarded, never fatal.
pub async fn drain_control(mut endpoint: DuplexStream) -> u64 {
    let mut buf = BytesMut::with_capacity(4 * CONTROL_MESSAGE_SIZE);
    let mut drained: u64 = 0;

    loop {
        match endpoint.read_buf(&mut buf).await {
            Ok(0) => {
                if !buf.is_empty() {
                    warn!(
                        len = buf.len(),
                        expected = CONTROL_MESSAGE_SIZE,
                        "short control frame on console bridge, discarding"
                    );
                }
                return drained;
            }
            Ok(_) => {
                while buf.len() >= CONTROL_MESSAGE_SIZE {
                    let record = buf.split_to(CONTROL_MESSAGE_SIZE);
                    drained += 1;
                    trace!(len = record.len(), "drained control message");
                }
            }
            Err(e) => {
                warn!("console bridge read error: {}", e);
                return drained;
            }
        }
    }
}
