//! Telnet line codec for the relay admin console.
//!
//! This crate implements the small slice of the telnet protocol the console
//! actually needs: it refuses every option the far end offers, strips IAC
//! command sequences out of the byte stream, and assembles the remaining
//! plain text into lines. Outbound text is escaped and newline-translated
//! for the wire.
//!
//! ## Wire behavior
//!
//! ```text
//! IAC WILL <opt>   ->  IAC DONT <opt>     (refuse remote option)
//! IAC DO   <opt>   ->  IAC WONT <opt>     (refuse local option)
//! IAC WONT/DONT    ->  ignored (already off)
//! IAC SB .. IAC SE ->  skipped entirely
//! IAC IAC          ->  literal 0xFF data byte
//! other IAC cmds   ->  ignored
//! ```
//!
//! The decoder is incremental: feed it whatever the socket produced and it
//! buffers partial lines and partial IAC sequences across calls.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod options;

pub use codec::{TelnetCodec, MAX_LINE_LEN};
pub use error::TelnetError;
pub use options::{
    OPT_BINARY, OPT_COMPRESS2, OPT_ECHO, OPT_MSSP, OPT_NAWS, OPT_TTYPE, OPT_ZMP, REFUSED_OPTIONS,
};
