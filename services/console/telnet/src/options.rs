//! Telnet command bytes and option codes.

/// Interpret As Command escape byte
pub const IAC: u8 = 255;
/// End of subnegotiation
pub const SE: u8 = 240;
/// Start of subnegotiation
pub const SB: u8 = 250;
/// Sender wants to enable an option on its side
pub const WILL: u8 = 251;
/// Sender refuses an option on its side
pub const WONT: u8 = 252;
/// Sender asks us to enable an option on our side
pub const DO: u8 = 253;
/// Sender asks us to disable an option on our side
pub const DONT: u8 = 254;

/// Binary transmission (RFC 856)
pub const OPT_BINARY: u8 = 0;
/// Echo (RFC 857)
pub const OPT_ECHO: u8 = 1;
/// Terminal type (RFC 1091)
pub const OPT_TTYPE: u8 = 24;
/// Negotiate about window size (RFC 1073)
pub const OPT_NAWS: u8 = 31;
/// MUD server status protocol
pub const OPT_MSSP: u8 = 70;
/// MCCP2 compression
pub const OPT_COMPRESS2: u8 = 86;
/// Zenith MUD protocol
pub const OPT_ZMP: u8 = 93;

/// Options the far end commonly probes for. The codec refuses every option,
/// listed or not; this table documents the capability set the console
/// declines up front.
pub const REFUSED_OPTIONS: &[u8] = &[
    OPT_ECHO,
    OPT_TTYPE,
    OPT_COMPRESS2,
    OPT_ZMP,
    OPT_MSSP,
    OPT_BINARY,
    OPT_NAWS,
];
