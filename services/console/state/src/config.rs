//! Static relay configuration.
//!
//! Everything in here is read-only for the life of the process; the console
//! renders it but never mutates it. Runtime-mutable flags live in
//! [`crate::flags::RuntimeFlags`] instead.

use serde::Deserialize;

/// Relay settings fixed at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Verbose diagnostics
    pub verbose: bool,
    /// Running as a daemon process
    pub daemon: bool,
    /// Startup ignored the configuration file
    pub no_config_file: bool,
    /// RFC 5780 (NAT behavior discovery) support
    pub rfc5780: bool,
    /// Plain UDP listeners disabled
    pub no_udp: bool,
    /// Plain TCP listeners disabled
    pub no_tcp: bool,
    /// DTLS listeners disabled
    pub no_dtls: bool,
    /// TLS listeners disabled
    pub no_tls: bool,
    /// Experimental network engine in use
    pub new_net_engine: bool,
    /// Fingerprints enforced on all messages
    pub fingerprint: bool,
    /// UDP listeners self-balance across workers
    pub udp_self_balance: bool,
    /// SHA256 digests enforced
    pub enforce_sha256: bool,

    /// Primary listener port
    pub listener_port: u16,
    /// TLS listener port
    pub tls_listener_port: u16,
    /// Alternate listener port
    pub alt_listener_port: u16,
    /// Alternate TLS listener port
    pub alt_tls_listener_port: u16,
    /// Lower bound of the relay port range
    pub min_port: u16,
    /// Upper bound of the relay port range
    pub max_port: u16,
    /// Per-session bandwidth cap, bytes per second, 0 = unlimited
    pub max_bps: u64,

    /// Statistics backend connection string, if configured
    pub stats_db: Option<String>,
    /// Allowed peer IP ranges
    pub ip_whitelist: Vec<String>,
    /// Forbidden peer IP ranges
    pub ip_blacklist: Vec<String>,
    /// Relay addresses this server allocates from
    pub relay_addrs: Vec<String>,
    /// Public IP advertised to peers behind NAT
    pub external_ip: Option<String>,
    /// Auxiliary server endpoints
    pub aux_servers: Vec<String>,
    /// Alternate server endpoints
    pub alternate_servers: Vec<String>,
    /// TLS alternate server endpoints
    pub tls_alternate_servers: Vec<String>,
    /// User database path, if configured
    pub user_db: Option<String>,

    /// Long-term credential mechanism enabled
    pub lt_credentials: bool,
    /// Short-term credential mechanism enabled
    pub st_credentials: bool,
    /// Anonymous credentials accepted
    pub anon_credentials: bool,
    /// REST API credential mechanism enabled
    pub rest_api: bool,
    /// REST API username separator, as an ASCII code
    pub rest_api_separator: Option<u8>,
    /// Authentication realm, if configured
    pub realm: Option<String>,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            daemon: false,
            no_config_file: false,
            rfc5780: true,
            no_udp: false,
            no_tcp: false,
            no_dtls: false,
            no_tls: false,
            new_net_engine: false,
            fingerprint: false,
            udp_self_balance: false,
            enforce_sha256: false,
            listener_port: 3478,
            tls_listener_port: 5349,
            alt_listener_port: 0,
            alt_tls_listener_port: 0,
            min_port: 49152,
            max_port: 65535,
            max_bps: 0,
            stats_db: None,
            ip_whitelist: Vec::new(),
            ip_blacklist: Vec::new(),
            relay_addrs: Vec::new(),
            external_ip: None,
            aux_servers: Vec::new(),
            alternate_servers: Vec::new(),
            tls_alternate_servers: Vec::new(),
            user_db: None,
            lt_credentials: false,
            st_credentials: false,
            anon_credentials: false,
            rest_api: false,
            rest_api_separator: None,
            realm: None,
        }
    }
}
