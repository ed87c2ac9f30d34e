//! Runtime-toggleable relay flags and the toggle registry.
//!
//! The registry is a fixed table of (name, accessor) pairs over
//! [`RuntimeFlags`]. Toggles are independent, immediately-visible,
//! last-write-wins flips; unknown names are rejected, never created.

use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// The boolean relay flags the console may flip at runtime.
///
/// Cells are atomics so sessions on the console loop can flip them while
/// the relay's own threads read them without locking.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeFlags {
    /// Stale-nonce rotation
    pub stale_nonce: AtomicBool,
    /// Serve STUN binding requests only
    pub stun_only: AtomicBool,
    /// Refuse STUN binding requests
    pub no_stun: AtomicBool,
    /// Require authentication for STUN binding requests
    pub secure_stun: AtomicBool,
    /// Server-relay mode
    pub server_relay: AtomicBool,
    /// Refuse UDP relay allocations
    pub no_udp_relay: AtomicBool,
    /// Refuse TCP relay allocations
    pub no_tcp_relay: AtomicBool,
    /// Refuse multicast peer addresses
    pub no_multicast_peers: AtomicBool,
    /// Refuse loopback peer addresses
    pub no_loopback_peers: AtomicBool,
    /// Mobility extension support
    pub mobility: AtomicBool,
}

/// One entry of the toggle registry: a parameter name bound to its cell.
pub struct ToggleEntry {
    /// Parameter name as typed in `tc <name>`
    pub name: &'static str,
    cell: fn(&RuntimeFlags) -> &AtomicBool,
}

impl ToggleEntry {
    /// Read the current value of this entry's cell
    pub fn get(&self, flags: &RuntimeFlags) -> bool {
        (self.cell)(flags).load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ToggleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToggleEntry").field("name", &self.name).finish()
    }
}

/// The toggle registry. Names are unique; order is the enumeration order
/// shown to operators.
pub const TOGGLES: &[ToggleEntry] = &[
    ToggleEntry { name: "stale-nonce", cell: |f| &f.stale_nonce },
    ToggleEntry { name: "stun-only", cell: |f| &f.stun_only },
    ToggleEntry { name: "no-stun", cell: |f| &f.no_stun },
    ToggleEntry { name: "secure-stun", cell: |f| &f.secure_stun },
    ToggleEntry { name: "server-relay", cell: |f| &f.server_relay },
    ToggleEntry { name: "no-udp-relay", cell: |f| &f.no_udp_relay },
    ToggleEntry { name: "no-tcp-relay", cell: |f| &f.no_tcp_relay },
    ToggleEntry { name: "no-multicast-peers", cell: |f| &f.no_multicast_peers },
    ToggleEntry { name: "no-loopback-peers", cell: |f| &f.no_loopback_peers },
    ToggleEntry { name: "mobility", cell: |f| &f.mobility },
];

impl RuntimeFlags {
    /// Flip the named flag and return its new value, or `None` if the name
    /// is not in the registry.
    pub fn toggle(&self, name: &str) -> Option<bool> {
        let entry = TOGGLES.iter().find(|e| e.name == name)?;
        let cell = (entry.cell)(self);
        let new_value = !cell.fetch_xor(true, Ordering::Relaxed);
        debug!(param = name, value = new_value, "toggled relay flag");
        Some(new_value)
    }

    /// Read the named flag, or `None` if the name is not in the registry.
    pub fn get(&self, name: &str) -> Option<bool> {
        TOGGLES.iter().find(|e| e.name == name).map(|e| e.get(self))
    }

    /// Enumerate every registry entry with its current value, in registry
    /// order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        TOGGLES.iter().map(move |e| (e.name, e.get(self)))
    }
}
