//! Session lifecycle engine for the relay admin console.
//!
//! This crate provides the remote administration subsystem embedded in the
//! relay server: a TCP acceptor on a private event loop, a per-connection
//! session state machine driving the telnet codec, the command dispatcher,
//! and the control-plane bridge that crosses back into the host thread.
//!
//! ## Concurrency model
//!
//! The whole console runs on one dedicated thread with a `current_thread`
//! runtime ([`ConsoleServer::spawn`]): console I/O can never stall the
//! relay's fast path, and session state needs no locking because only the
//! console loop touches it. The only thing permitted to cross the thread
//! boundary is the [`bridge`] channel.
//!
//! ## Example
//!
//! ```rust,no_run
//! use console_session::{control_bridge, ConsoleConfig, ConsoleServer};
//! use console_state::RelayState;
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let state = Arc::new(RelayState::default());
//! let (console_end, host_end) = control_bridge();
//!
//! let config = ConsoleConfig {
//!     password: Some("secret".into()),
//!     ..ConsoleConfig::default()
//! };
//!
//! // The console lives on its own thread; a setup failure is logged and
//! // leaves the host running without remote administration.
//! let _handle = ConsoleServer::spawn(config, state, console_end)?;
//!
//! // The host keeps its endpoint for future control pushes.
//! let _host_end = host_end;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod dispatcher;
pub mod server;
pub mod session;
pub mod transport;

pub use bridge::{control_bridge, drain_control, ControlMessage, CONTROL_MESSAGE_SIZE};
pub use dispatcher::{trim_line, Command, CURSOR, HELP_TEXT};
pub use server::{serve, ConsoleConfig, ConsoleServer, CONSOLE_DEFAULT_IP, CONSOLE_DEFAULT_PORT};
pub use session::{ConsoleSession, SessionOutcome, PASSWORD_ATTEMPT_LIMIT};
pub use transport::listen_tcp;
