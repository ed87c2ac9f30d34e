//! Read-only rendering of the relay configuration for the `pc` command.
//!
//! One line per item, fixed order: boolean flags, then ports and limits,
//! then address- and list-valued items, then authentication mechanisms,
//! then the realm. Toggleable items carry a ` (*)` marker; conditionally
//! present items are omitted entirely when unset.

use crate::RelayState;
use std::fmt::Write;

/// Closing note explaining the toggleable marker.
pub const TOGGLE_NOTE: &str = "\n  (Note: params with (*) are 'toggleable')\n";

/// Render one boolean flag line without the toggleable marker, as used by
/// the `tc` command output and the toggle enumeration.
pub fn format_flag(name: &str, value: bool) -> String {
    let mut out = String::new();
    push_flag(&mut out, name, value, false);
    out
}

fn push_flag(out: &mut String, name: &str, value: bool, toggleable: bool) {
    let value = if value { "ON" } else { "OFF" };
    let marker = if toggleable { " (*)" } else { "" };
    let _ = writeln!(out, "  {}: {}{}", name, value, marker);
}

fn push_uint(out: &mut String, name: &str, value: u64) {
    let _ = writeln!(out, "  {}: {}", name, value);
}

fn push_str(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "  {}: {}", name, value);
}

fn push_list(out: &mut String, name: &str, values: &[String]) {
    for value in values {
        push_str(out, name, value);
    }
}

/// Render the full configuration snapshot, ending with the `(*)` note.
///
/// Side-effect free: repeated calls produce identical output absent
/// intervening toggles.
pub fn print_configuration(state: &RelayState) -> String {
    let cfg = &state.config;
    let flags = &state.flags;
    let mut out = String::new();

    push_flag(&mut out, "verbose", cfg.verbose, false);
    push_flag(&mut out, "daemon process", cfg.daemon, false);
    push_flag(&mut out, "stale-nonce", flags.get("stale-nonce").unwrap_or(false), true);
    push_flag(&mut out, "stun-only", flags.get("stun-only").unwrap_or(false), true);
    push_flag(&mut out, "no-stun", flags.get("no-stun").unwrap_or(false), true);
    push_flag(&mut out, "secure-stun", flags.get("secure-stun").unwrap_or(false), true);
    push_flag(&mut out, "server-relay", flags.get("server-relay").unwrap_or(false), true);
    push_flag(&mut out, "do-not-use-config-file", cfg.no_config_file, false);
    push_flag(&mut out, "RFC5780 support", cfg.rfc5780, false);
    push_flag(&mut out, "no-udp", cfg.no_udp, false);
    push_flag(&mut out, "no-tcp", cfg.no_tcp, false);
    push_flag(&mut out, "no-dtls", cfg.no_dtls, false);
    push_flag(&mut out, "no-tls", cfg.no_tls, false);
    push_flag(&mut out, "no-udp-relay", flags.get("no-udp-relay").unwrap_or(false), true);
    push_flag(&mut out, "no-tcp-relay", flags.get("no-tcp-relay").unwrap_or(false), true);
    push_flag(&mut out, "new net engine", cfg.new_net_engine, false);
    push_flag(
        &mut out,
        "no-multicast-peers",
        flags.get("no-multicast-peers").unwrap_or(false),
        true,
    );
    push_flag(
        &mut out,
        "no-loopback-peers",
        flags.get("no-loopback-peers").unwrap_or(false),
        true,
    );
    push_flag(&mut out, "enforce fingerprints", cfg.fingerprint, false);
    push_flag(&mut out, "mobility", flags.get("mobility").unwrap_or(false), true);
    push_flag(&mut out, "udp-self-balance", cfg.udp_self_balance, false);
    push_flag(&mut out, "enforce SHA256", cfg.enforce_sha256, false);

    push_uint(&mut out, "listener-port", cfg.listener_port as u64);
    push_uint(&mut out, "tls-listener-port", cfg.tls_listener_port as u64);
    push_uint(&mut out, "alt-listener-port", cfg.alt_listener_port as u64);
    push_uint(&mut out, "alt-tls-listener-port", cfg.alt_tls_listener_port as u64);
    push_uint(&mut out, "min-port", cfg.min_port as u64);
    push_uint(&mut out, "max-port", cfg.max_port as u64);
    push_uint(&mut out, "max-bps", cfg.max_bps);

    if let Some(stats_db) = &cfg.stats_db {
        push_str(&mut out, "Statistics DB", stats_db);
    }
    push_list(&mut out, "Whitelist IP", &cfg.ip_whitelist);
    push_list(&mut out, "Blacklist IP", &cfg.ip_blacklist);
    push_list(&mut out, "Relay addr", &cfg.relay_addrs);
    if let Some(external_ip) = &cfg.external_ip {
        push_str(&mut out, "External public IP", external_ip);
    }
    push_list(&mut out, "Aux server", &cfg.aux_servers);
    push_list(&mut out, "Alternate server", &cfg.alternate_servers);
    push_list(&mut out, "TLS alternate server", &cfg.tls_alternate_servers);
    if let Some(user_db) = &cfg.user_db {
        push_str(&mut out, "DB", user_db);
    }

    push_flag(&mut out, "Long-term authorization mechanism", cfg.lt_credentials, false);
    push_flag(&mut out, "Short-term authorization mechanism", cfg.st_credentials, false);
    push_flag(&mut out, "Anonymous credentials", cfg.anon_credentials, false);
    push_flag(&mut out, "REST API", cfg.rest_api, false);
    if cfg.rest_api {
        if let Some(separator) = cfg.rest_api_separator {
            push_uint(&mut out, "REST API separator ASCII number", separator as u64);
        }
    }
    if let Some(realm) = &cfg.realm {
        push_str(&mut out, "Realm", realm);
    }

    out.push_str(TOGGLE_NOTE);
    out
}
