//! Relay configuration state exposed to the admin console.
//!
//! This crate holds the process-wide relay configuration in two parts:
//! [`StaticConfig`], immutable for the life of the process, and
//! [`RuntimeFlags`], a fixed set of boolean cells the console may flip at
//! runtime through the toggle registry. The snapshot printer renders both
//! into the `pc` command output.
//!
//! Mutation is deliberately narrow: only the cells named in [`TOGGLES`]
//! can change after startup, one cell at a time, last write wins.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod flags;
pub mod snapshot;

pub use config::StaticConfig;
pub use flags::{RuntimeFlags, ToggleEntry, TOGGLES};
pub use snapshot::{format_flag, print_configuration, TOGGLE_NOTE};

/// Process-wide relay state shared with the console.
///
/// One instance per process, created at startup and never torn down
/// explicitly; the process exits with it.
#[derive(Debug, Default)]
pub struct RelayState {
    /// Settings fixed at startup
    pub config: StaticConfig,
    /// Runtime-toggleable flags
    pub flags: RuntimeFlags,
}
