//! Per-connection console session state machine.
//!
//! A session owns its socket, its telnet codec instance, and its
//! authentication state. It is driven entirely by readiness on the console
//! loop: bytes in, codec events out, lines into the dispatcher. Teardown is
//! RAII; every exit path releases the socket and codec exactly once by
//! falling out of [`ConsoleSession::run`].

use crate::dispatcher::{trim_line, Command, CURSOR, HELP_TEXT};
use crate::server::ConsoleConfig;
use crate::transport::apply_socket_options;
use bytes::BytesMut;
use console_state::{format_flag, print_configuration, RelayState};
use console_telnet::TelnetCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Number of password attempts tolerated before forced disconnect.
pub const PASSWORD_ATTEMPT_LIMIT: u64 = 5;

const GREETING: &str = concat!(
    "Relay Server\n",
    "relay-console ",
    env!("CARGO_PKG_VERSION"),
    "\nType '?' for help\n"
);

const PASSWORD_PROMPT: &str = "Enter password: ";
const FAREWELL: &str = "Bye !";
const SHUTDOWN_NOTICE: &str = "Relay server is shutting down";
const UNKNOWN_COMMAND: &str = "Unknown command\n";

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The session closed; the process keeps running
    Closed,
    /// The operator issued a shutdown command; the caller must terminate
    /// the process after this session's resources are released
    ShutdownRequested,
}

/// Authentication progress of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthState {
    /// A password is configured and has not been matched yet
    AwaitingPassword,
    /// Commands are accepted
    Authenticated,
}

/// What the dispatcher decided about the session's future.
enum Flow {
    Continue,
    Close,
    Shutdown,
}

/// One accepted console connection.
///
/// The codec instance is never shared across sessions and never outlives
/// its session.
pub struct ConsoleSession {
    io: BufWriter<TcpStream>,
    codec: TelnetCodec,
    peer: SocketAddr,
    auth: AuthState,
    cmds: u64,
    config: Arc<ConsoleConfig>,
    state: Arc<RelayState>,
}

impl ConsoleSession {
    /// Wrap an accepted connection in a session.
    pub fn new(
        config: Arc<ConsoleConfig>,
        state: Arc<RelayState>,
        stream: TcpStream,
        peer: SocketAddr,
    ) -> Self {
        apply_socket_options(&stream);
        let auth = if config.password.as_deref().unwrap_or("").is_empty() {
            AuthState::Authenticated
        } else {
            AuthState::AwaitingPassword
        };
        Self {
            io: BufWriter::new(stream),
            codec: TelnetCodec::new(),
            peer,
            auth,
            cmds: 0,
            config,
            state,
        }
    }

    /// Drive the session until it closes.
    ///
    /// Transport errors and EOF end the session without touching the rest
    /// of the process; a [`SessionOutcome::ShutdownRequested`] return is
    /// the caller's cue to exit.
    pub async fn run(mut self) -> anyhow::Result<SessionOutcome> {
        self.send(GREETING).await?;
        match self.auth {
            AuthState::AwaitingPassword => self.send(PASSWORD_PROMPT).await?,
            AuthState::Authenticated => self.send(CURSOR).await?,
        }
        self.io.flush().await?;

        let mut buf = BytesMut::with_capacity(1024);
        loop {
            let n = self.io.read_buf(&mut buf).await?;
            if n == 0 {
                self.log_disconnect();
                return Ok(SessionOutcome::Closed);
            }

            let lines = match self.codec.decode(&mut buf) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!(peer = %self.peer, "console input rejected: {}", e);
                    self.log_disconnect();
                    return Ok(SessionOutcome::Closed);
                }
            };

            // Negotiation refusals go out before any command output
            if let Some(replies) = self.codec.take_replies() {
                self.io.write_all(&replies).await?;
            }

            for line in &lines {
                match self.handle_line(line).await? {
                    Flow::Continue => {}
                    Flow::Close => {
                        self.close().await;
                        return Ok(SessionOutcome::Closed);
                    }
                    Flow::Shutdown => {
                        self.close().await;
                        return Ok(SessionOutcome::ShutdownRequested);
                    }
                }
            }

            self.io.flush().await?;
        }
    }

    /// One input line through the authentication gate and the dispatcher.
    async fn handle_line(&mut self, raw: &str) -> anyhow::Result<Flow> {
        let line = trim_line(raw);
        if line.is_empty() {
            self.send(CURSOR).await?;
            return Ok(Flow::Continue);
        }

        self.cmds += 1;

        if self.auth == AuthState::AwaitingPassword {
            let password = self.config.password.as_deref().unwrap_or("");
            if line != password {
                if self.cmds >= PASSWORD_ATTEMPT_LIMIT {
                    warn!(peer = %self.peer, "console authentication error");
                    return Ok(Flow::Close);
                }
                self.send(PASSWORD_PROMPT).await?;
            } else {
                self.auth = AuthState::Authenticated;
                info!(peer = %self.peer, "console authentication success");
                self.send(CURSOR).await?;
            }
            return Ok(Flow::Continue);
        }

        self.dispatch(Command::parse(line)).await
    }

    async fn dispatch(&mut self, command: Command<'_>) -> anyhow::Result<Flow> {
        match command {
            Command::Empty => {
                self.send(CURSOR).await?;
            }
            Command::Quit => {
                self.send(FAREWELL).await?;
                return Ok(Flow::Close);
            }
            Command::Shutdown => {
                info!(peer = %self.peer, "console user sent shutdown command");
                self.send(SHUTDOWN_NOTICE).await?;
                return Ok(Flow::Shutdown);
            }
            Command::Help => {
                self.send(HELP_TEXT).await?;
                self.send(CURSOR).await?;
            }
            Command::PrintConfig => {
                let snapshot = print_configuration(&self.state);
                self.send(&snapshot).await?;
                self.send(CURSOR).await?;
            }
            Command::Toggle(param) => {
                self.toggle_param(param).await?;
                self.send(CURSOR).await?;
            }
            Command::Unknown => {
                self.send(UNKNOWN_COMMAND).await?;
                self.send(CURSOR).await?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Flip a toggleable parameter, or enumerate the valid vocabulary when
    /// the name is unknown. An unrecognized toggle is always
    /// self-documenting in its response.
    async fn toggle_param(&mut self, param: &str) -> anyhow::Result<()> {
        match self.state.flags.toggle(param) {
            Some(value) => {
                self.send(&format_flag(param, value)).await?;
            }
            None => {
                let header = format!(
                    "\n  Error: unknown or constant parameter: {}.\n  You can toggle only the following parameters:\n\n",
                    param
                );
                self.send(&header).await?;
                let listing: String = self
                    .state
                    .flags
                    .entries()
                    .map(|(name, value)| format_flag(name, value))
                    .collect();
                self.send(&listing).await?;
                self.send("\n").await?;
            }
        }
        Ok(())
    }

    /// Flush pending output and shut the socket down. Errors here are
    /// ignored; the remote may already be gone.
    async fn close(&mut self) {
        let _ = self.io.flush().await;
        let _ = self.io.get_mut().shutdown().await;
        self.log_disconnect();
    }

    fn log_disconnect(&self) {
        if self.config.verbose {
            info!(peer = %self.peer, cmds = self.cmds, "console session disconnected");
        } else {
            debug!(peer = %self.peer, cmds = self.cmds, "console session disconnected");
        }
    }

    async fn send(&mut self, text: &str) -> tokio::io::Result<()> {
        let encoded = TelnetCodec::encode(text);
        self.io.write_all(&encoded).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::listen_tcp;
    use console_telnet::options::{DONT, IAC, WILL};
    use console_telnet::OPT_ECHO;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    async fn start_session(
        password: Option<&str>,
        state: Arc<RelayState>,
    ) -> (TcpStream, JoinHandle<anyhow::Result<SessionOutcome>>) {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let listener = listen_tcp(addr).await.unwrap();
        let bound_addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(bound_addr).await.unwrap();
        let (server, peer) = listener.accept().await.unwrap();

        let config = Arc::new(ConsoleConfig {
            password: password.map(str::to_string),
            ..ConsoleConfig::default()
        });
        let session = ConsoleSession::new(config, state, server, peer);
        let handle = tokio::spawn(session.run());

        (client, handle)
    }

    /// Read until the accumulated output contains `needle`.
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

    async fn read_to_eof(client: &mut TcpStream) -> String {
        let mut collected = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = timeout(Duration::from_secs(2), client.read(&mut chunk))
                .await
                .expect("timed out waiting for EOF")
                .unwrap();
            if n == 0 {
                return String::from_utf8_lossy(&collected).into_owned();
            }
            collected.extend_from_slice(&chunk[..n]);
        }
    }

    #[tokio::test]
    async fn test_no_password_greets_with_cursor() {
        let (mut client, _handle) = start_session(None, Arc::new(RelayState::default())).await;
        let banner = read_until(&mut client, "> ").await;
        assert!(banner.contains("Type '?' for help"));
        assert!(!banner.contains("Enter password"));
    }

    #[tokio::test]
    async fn test_password_prompted_before_cursor() {
        let (mut client, _handle) =
            start_session(Some("secret"), Arc::new(RelayState::default())).await;
        let banner = read_until(&mut client, "Enter password: ").await;
        assert!(!banner.contains("> "));
    }

    #[tokio::test]
    async fn test_wrong_password_reprompts_then_correct_authenticates() {
        let state = Arc::new(RelayState::default());
        let (mut client, _handle) = start_session(Some("secret"), state).await;
        read_until(&mut client, "Enter password: ").await;

        client.write_all(b"wrong\r\n").await.unwrap();
        read_until(&mut client, "Enter password: ").await;

        client.write_all(b"secret\r\n").await.unwrap();
        read_until(&mut client, "> ").await;

        client.write_all(b"pc\r\n").await.unwrap();
        let dump = read_until(&mut client, "(Note: params with (*) are 'toggleable')").await;
        assert!(dump.contains("listener-port: 3478"));
    }

    #[tokio::test]
    async fn test_fifth_mismatch_closes_connection() {
        let (mut client, handle) =
            start_session(Some("secret"), Arc::new(RelayState::default())).await;
        read_until(&mut client, "Enter password: ").await;

        // Four mismatches re-prompt
        for _ in 0..4 {
            client.write_all(b"nope\r\n").await.unwrap();
        }
        // The fifth closes without a message
        client.write_all(b"nope\r\n").await.unwrap();
        read_to_eof(&mut client).await;

        let outcome = timeout(Duration::from_secs(2), handle).await.unwrap();
        assert_eq!(outcome.unwrap().unwrap(), SessionOutcome::Closed);
    }

    #[tokio::test]
    async fn test_late_correct_password_still_authenticates() {
        let (mut client, _handle) =
            start_session(Some("secret"), Arc::new(RelayState::default())).await;
        read_until(&mut client, "Enter password: ").await;

        for _ in 0..3 {
            client.write_all(b"nope\r\n").await.unwrap();
        }
        client.write_all(b"secret\r\n").await.unwrap();
        read_until(&mut client, "> ").await;
    }

    #[tokio::test]
    async fn test_whitespace_line_redisplays_cursor_only() {
        let (mut client, _handle) = start_session(None, Arc::new(RelayState::default())).await;
        read_until(&mut client, "> ").await;

        client.write_all(b"   \t\r\n").await.unwrap();
        let out = read_until(&mut client, "> ").await;
        assert!(!out.contains("Unknown command"));
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let state = Arc::new(RelayState::default());
        let (mut client, _handle) = start_session(None, state.clone()).await;
        read_until(&mut client, "> ").await;

        client.write_all(b"tc stale-nonce\r\n").await.unwrap();
        let out = read_until(&mut client, "stale-nonce: ON").await;
        assert!(out.contains("  stale-nonce: ON"));
        assert_eq!(state.flags.get("stale-nonce"), Some(true));

        client.write_all(b"tc stale-nonce\r\n").await.unwrap();
        read_until(&mut client, "stale-nonce: OFF").await;
        assert_eq!(state.flags.get("stale-nonce"), Some(false));
    }

    #[tokio::test]
    async fn test_unknown_toggle_enumerates_vocabulary() {
        let state = Arc::new(RelayState::default());
        let (mut client, _handle) = start_session(None, state.clone()).await;
        read_until(&mut client, "> ").await;

        client.write_all(b"tc not-a-real-param\r\n").await.unwrap();
        let out = read_until(&mut client, "mobility: OFF").await;
        assert!(out.contains("Error: unknown or constant parameter: not-a-real-param."));
        for (name, _) in state.flags.entries() {
            assert!(out.contains(name), "missing {} in enumeration", name);
        }
        assert_eq!(state.flags.get("stale-nonce"), Some(false));
    }

    #[tokio::test]
    async fn test_help_ends_with_cursor() {
        let (mut client, _handle) = start_session(None, Arc::new(RelayState::default())).await;
        read_until(&mut client, "> ").await;

        client.write_all(b"?\r\n").await.unwrap();
        let out = read_until(&mut client, "> ").await;
        assert!(out.contains("toggle configuration parameter"));
    }

    #[tokio::test]
    async fn test_unknown_command_reported_inline() {
        let (mut client, _handle) = start_session(None, Arc::new(RelayState::default())).await;
        read_until(&mut client, "> ").await;

        client.write_all(b"frobnicate\r\n").await.unwrap();
        let out = read_until(&mut client, "> ").await;
        assert!(out.contains("Unknown command"));
    }

    #[tokio::test]
    async fn test_quit_says_bye_and_closes() {
        let (mut client, handle) = start_session(None, Arc::new(RelayState::default())).await;
        read_until(&mut client, "> ").await;

        client.write_all(b"quit\r\n").await.unwrap();
        let out = read_to_eof(&mut client).await;
        assert!(out.contains("Bye !"));

        let outcome = timeout(Duration::from_secs(2), handle).await.unwrap();
        assert_eq!(outcome.unwrap().unwrap(), SessionOutcome::Closed);
    }

    #[tokio::test]
    async fn test_shutdown_sends_notice_and_requests_exit() {
        let (mut client, handle) = start_session(None, Arc::new(RelayState::default())).await;
        read_until(&mut client, "> ").await;

        client.write_all(b"shutdown\r\n").await.unwrap();
        let out = read_to_eof(&mut client).await;
        assert!(out.contains(SHUTDOWN_NOTICE));

        let outcome = timeout(Duration::from_secs(2), handle).await.unwrap();
        assert_eq!(outcome.unwrap().unwrap(), SessionOutcome::ShutdownRequested);
    }

    #[tokio::test]
    async fn test_option_offer_is_refused_before_output() {
        let (mut client, _handle) = start_session(None, Arc::new(RelayState::default())).await;
        read_until(&mut client, "> ").await;

        let mut probe = Vec::new();
        probe.extend_from_slice(&[IAC, WILL, OPT_ECHO]);
        probe.extend_from_slice(b"pc\r\n");
        client.write_all(&probe).await.unwrap();

        let mut reply = [0u8; 3];
        timeout(Duration::from_secs(2), client.read_exact(&mut reply))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply, [IAC, DONT, OPT_ECHO]);
        read_until(&mut client, "(Note:").await;
    }

    #[tokio::test]
    async fn test_remote_eof_closes_session() {
        let (client, handle) = start_session(None, Arc::new(RelayState::default())).await;
        drop(client);
        let outcome = timeout(Duration::from_secs(2), handle).await.unwrap();
        assert_eq!(outcome.unwrap().unwrap(), SessionOutcome::Closed);
    }
}
