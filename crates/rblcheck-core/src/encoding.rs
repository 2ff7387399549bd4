//! DNSBL query name encoding.
//!
//! Standard DNSBL pattern: reverse the address and query it under the zone.
//! Example: checking 1.2.3.4 against `bl.example.com` queries
//! `4.3.2.1.bl.example.com.`
//!
//! IPv6 addresses use the nibble format from RFC 5782: all 32 hex digits of
//! the expanded address, least significant first, dot-separated.

use std::fmt::Write as _;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Reverse an IPv4 address for DNSBL lookup.
///
/// Converts `1.2.3.4` into `4.3.2.1` (without zone suffix).
#[must_use]
pub fn reverse_ipv4(ip: &Ipv4Addr) -> String {
    let octets = ip.octets();
    format!("{}.{}.{}.{}", octets[3], octets[2], octets[1], octets[0])
}

/// Reverse an IPv6 address into nibble form (without zone suffix).
#[must_use]
pub fn reverse_ipv6(ip: &Ipv6Addr) -> String {
    let mut out = String::with_capacity(63);
    for byte in ip.octets().iter().rev() {
        for nibble in [byte & 0x0f, byte >> 4] {
            if !out.is_empty() {
                out.push('.');
            }
            let _ = write!(out, "{nibble:x}");
        }
    }
    out
}

/// Reverse any address for DNSBL lookup.
#[must_use]
pub fn reverse_ip(ip: &IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => reverse_ipv4(v4),
        IpAddr::V6(v6) => reverse_ipv6(v6),
    }
}

/// Build the fully qualified DNSBL query name for an address under a zone.
///
/// The result always ends with the root label so that resolver search
/// domains are never appended.
///
/// Example: `query_name(1.2.3.4, "bl.example.com")` -> `"4.3.2.1.bl.example.com."`
#[must_use]
pub fn query_name(ip: &IpAddr, zone: &str) -> String {
    let zone = zone.trim_end_matches('.');
    format!("{}.{zone}.", reverse_ip(ip))
}
