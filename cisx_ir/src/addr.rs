//! Address and mask helpers shared by the model and the dialect parsers.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Serialize};

/// IP address family of an [`Addr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddrFamily {
    #[default]
    V4,
    V6,
}

impl AddrFamily {
    /// Prefix length of a single host in this family.
    pub fn host_prefix(self) -> u8 {
        match self {
            AddrFamily::V4 => 32,
            AddrFamily::V6 => 128,
        }
    }
}

/// One configured address with prefix length and HA metadata.
///
/// Equality is structural over address text, prefix, standby and secondary;
/// the family is implied by the address text and is not compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addr {
    pub address: String,
    pub prefix: u8,
    pub family: AddrFamily,
    pub standby: Option<String>,
    pub secondary: bool,
}

impl Addr {
    /// IPv4 host address (`/32`).
    pub fn host(address: impl Into<String>) -> Self {
        Self::with_prefix(address, 32)
    }

    /// IPv4 address with an explicit prefix length.
    pub fn with_prefix(address: impl Into<String>, prefix: u8) -> Self {
        Self {
            address: address.into(),
            prefix,
            family: AddrFamily::V4,
            standby: None,
            secondary: false,
        }
    }

    /// IPv6 address with an explicit prefix length.
    pub fn v6(address: impl Into<String>, prefix: u8) -> Self {
        Self {
            address: address.into(),
            prefix,
            family: AddrFamily::V6,
            standby: None,
            secondary: false,
        }
    }

    /// The `0.0.0.0/0` address used by the `any` keyword.
    pub fn any() -> Self {
        Self::with_prefix("0.0.0.0", 0)
    }
}

impl PartialEq for Addr {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.prefix == other.prefix
            && self.standby == other.standby
            && self.secondary == other.secondary
    }
}

impl Eq for Addr {}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bare = match self.family {
            AddrFamily::V4 => self.prefix == 32,
            AddrFamily::V6 => self.prefix == 64,
        };
        if bare {
            f.write_str(&self.address)
        } else {
            write!(f, "{}/{}", self.address, self.prefix)
        }
    }
}

/// Convert a dotted-quad mask into a prefix length.
///
/// Counts the leading one bits of the mask read as a big-endian `u32`. Bits
/// after the first zero are ignored, so a non-contiguous mask yields the
/// length of its leading run. Returns `None` when `mask` is not a dotted quad.
pub fn mask_to_prefix(mask: &str) -> Option<u8> {
    let mask: Ipv4Addr = mask.parse().ok()?;
    let ones = u32::from(mask).leading_ones();
    u8::try_from(ones).ok()
}

/// Split `addr/len` into the address text and the optional prefix length.
///
/// A suffix that is not a number is kept as part of the address.
pub fn split_prefix(token: &str) -> (&str, Option<u8>) {
    match token.split_once('/') {
        Some((addr, len)) => match len.parse::<u8>() {
            Ok(len) => (addr, Some(len)),
            Err(_) => (token, None),
        },
        None => (token, None),
    }
}

/// Parse an IPv4 token with an optional `/len` suffix.
pub fn parse_v4_token(token: &str) -> Option<(&str, Option<u8>)> {
    let (addr, prefix) = split_prefix(token);
    addr.parse::<Ipv4Addr>().ok()?;
    if prefix.is_some_and(|p| p > 32) {
        return None;
    }
    Some((addr, prefix))
}

/// Parse an IPv6 token with an optional `/len` suffix.
pub fn parse_v6_token(token: &str) -> Option<(&str, Option<u8>)> {
    let (addr, prefix) = split_prefix(token);
    addr.parse::<Ipv6Addr>().ok()?;
    if prefix.is_some_and(|p| p > 128) {
        return None;
    }
    Some((addr, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_to_prefix_counts_leading_ones() {
        assert_eq!(mask_to_prefix("255.255.255.0"), Some(24));
        assert_eq!(mask_to_prefix("255.255.254.0"), Some(23));
        assert_eq!(mask_to_prefix("0.0.0.0"), Some(0));
        assert_eq!(mask_to_prefix("255.255.255.255"), Some(32));
    }

    #[test]
    fn mask_to_prefix_stops_at_first_zero_bit() {
        assert_eq!(mask_to_prefix("255.0.255.0"), Some(8));
        assert_eq!(mask_to_prefix("128.255.255.255"), Some(1));
    }

    #[test]
    fn mask_to_prefix_rejects_non_dotted_quads() {
        assert_eq!(mask_to_prefix("255.255.255"), None);
        assert_eq!(mask_to_prefix("255.255.255.256"), None);
        assert_eq!(mask_to_prefix("mask"), None);
    }

    #[test]
    fn split_prefix_handles_inline_length() {
        assert_eq!(split_prefix("10.0.0.0/8"), ("10.0.0.0", Some(8)));
        assert_eq!(split_prefix("10.0.0.1"), ("10.0.0.1", None));
        assert_eq!(split_prefix("a/b"), ("a/b", None));
    }

    #[test]
    fn token_classification_by_family() {
        assert_eq!(parse_v4_token("192.0.2.1"), Some(("192.0.2.1", None)));
        assert_eq!(parse_v4_token("192.0.2.0/24"), Some(("192.0.2.0", Some(24))));
        assert_eq!(parse_v4_token("192.0.2.0/33"), None);
        assert_eq!(parse_v4_token("WEB1"), None);
        assert_eq!(parse_v6_token("2001:db8::/48"), Some(("2001:db8::", Some(48))));
        assert_eq!(parse_v6_token("192.0.2.1"), None);
        assert_eq!(parse_v6_token("cafe"), None);
    }

    #[test]
    fn display_omits_host_and_v6_default_prefix() {
        assert_eq!(Addr::host("10.0.0.1").to_string(), "10.0.0.1");
        assert_eq!(Addr::with_prefix("10.0.0.0", 24).to_string(), "10.0.0.0/24");
        assert_eq!(Addr::v6("2001:db8::", 64).to_string(), "2001:db8::");
        assert_eq!(Addr::v6("2001:db8::1", 128).to_string(), "2001:db8::1/128");
    }

    #[test]
    fn equality_ignores_family() {
        let mut a = Addr::host("10.0.0.1");
        let b = Addr::host("10.0.0.1");
        a.family = AddrFamily::V6;
        assert_eq!(a, b);

        let mut c = Addr::host("10.0.0.1");
        c.secondary = true;
        assert_ne!(c, b);
    }
}
