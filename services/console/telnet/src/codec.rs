//! Incremental telnet decoding and outbound text encoding.

use crate::error::TelnetError;
use crate::options::{DO, DONT, IAC, SB, SE, WILL, WONT};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

/// Default high watermark for a single input line. A remote that streams
/// more than this without a newline is torn down rather than buffered.
pub const MAX_LINE_LEN: usize = 4096;

/// Decoder state between input bytes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Plain data bytes
    #[default]
    Data,
    /// Seen IAC, waiting for the command byte
    Command,
    /// Seen IAC WILL/WONT/DO/DONT, waiting for the option byte
    Option(u8),
    /// Inside an IAC SB .. IAC SE block
    Subnegotiation,
    /// Seen IAC inside a subnegotiation block
    SubnegotiationCommand,
}

/// Per-session telnet codec.
///
/// One instance per connection; never shared across sessions. Negotiation
/// replies produced while decoding accumulate internally and must be
/// flushed to the socket via [`TelnetCodec::take_replies`].
#[derive(Debug)]
pub struct TelnetCodec {
    state: DecodeState,
    line: Vec<u8>,
    replies: BytesMut,
    max_line: usize,
}

impl Default for TelnetCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl TelnetCodec {
    /// Create a codec with the default line watermark
    pub fn new() -> Self {
        Self::with_max_line(MAX_LINE_LEN)
    }

    /// Create a codec with a custom line watermark
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            state: DecodeState::Data,
            line: Vec::new(),
            replies: BytesMut::new(),
            max_line,
        }
    }

    /// Consume everything in `input` and return the completed lines.
    ///
    /// Lines are newline-terminated on the wire; the terminator is not
    /// included in the returned strings (a trailing carriage return is,
    /// and is stripped later by the command dispatcher). Partial lines and
    /// partial IAC sequences survive until the next call.
    pub fn decode(&mut self, input: &mut BytesMut) -> Result<Vec<String>, TelnetError> {
        let mut lines = Vec::new();

        for byte in input.split().into_iter() {
            match self.state {
                DecodeState::Data => match byte {
                    IAC => self.state = DecodeState::Command,
                    b'\n' => {
                        let raw = std::mem::take(&mut self.line);
                        lines.push(String::from_utf8_lossy(&raw).into_owned());
                    }
                    _ => {
                        if self.line.len() >= self.max_line {
                            return Err(TelnetError::LineTooLong(self.max_line));
                        }
                        self.line.push(byte);
                    }
                },
                DecodeState::Command => match byte {
                    IAC => {
                        // Escaped literal 0xFF
                        if self.line.len() >= self.max_line {
                            return Err(TelnetError::LineTooLong(self.max_line));
                        }
                        self.line.push(IAC);
                        self.state = DecodeState::Data;
                    }
                    WILL | WONT | DO | DONT => self.state = DecodeState::Option(byte),
                    SB => self.state = DecodeState::Subnegotiation,
                    _ => {
                        // NOP, GA, and friends carry no argument
                        self.state = DecodeState::Data;
                    }
                },
                DecodeState::Option(verb) => {
                    match verb {
                        WILL => {
                            trace!(option = byte, "refusing remote telnet option");
                            self.replies.put_slice(&[IAC, DONT, byte]);
                        }
                        DO => {
                            trace!(option = byte, "refusing local telnet option");
                            self.replies.put_slice(&[IAC, WONT, byte]);
                        }
                        _ => {
                            // WONT/DONT confirm a state we are already in
                        }
                    }
                    self.state = DecodeState::Data;
                }
                DecodeState::Subnegotiation => {
                    if byte == IAC {
                        self.state = DecodeState::SubnegotiationCommand;
                    }
                }
                DecodeState::SubnegotiationCommand => match byte {
                    SE => self.state = DecodeState::Data,
                    IAC => self.state = DecodeState::Subnegotiation,
                    _ => self.state = DecodeState::Subnegotiation,
                },
            }
        }

        Ok(lines)
    }

    /// Take the negotiation replies accumulated since the last call, if any.
    /// The caller writes these to the socket before any command output so
    /// refusals are never reordered behind session text.
    pub fn take_replies(&mut self) -> Option<Bytes> {
        if self.replies.is_empty() {
            None
        } else {
            Some(self.replies.split().freeze())
        }
    }

    /// Encode outbound text for the wire: escape 0xFF and translate bare
    /// newlines to CRLF.
    pub fn encode(text: &str) -> Bytes {
        let mut out = BytesMut::with_capacity(text.len() + 16);
        for &byte in text.as_bytes() {
            match byte {
                IAC => out.put_slice(&[IAC, IAC]),
                b'\n' => out.put_slice(b"\r\n"),
                _ => out.put_u8(byte),
            }
        }
        out.freeze()
    }
}
