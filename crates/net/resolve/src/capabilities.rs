//! Host address-family support and DNS family filters.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, UdpSocket};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which IP families the running host can dial.
///
/// Resolved addresses of an unsupported family are dropped silently. Build
/// this once at startup and hand it to [`Resolver::new`](crate::Resolver::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCapabilities {
    /// IPv4 transport is available.
    pub ipv4: bool,
    /// IPv6 transport is available.
    pub ipv6: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl HostCapabilities {
    /// Both families enabled.
    pub const fn all() -> Self {
        Self {
            ipv4: true,
            ipv6: true,
        }
    }

    pub const fn ipv4_only() -> Self {
        Self {
            ipv4: true,
            ipv6: false,
        }
    }

    pub const fn ipv6_only() -> Self {
        Self {
            ipv4: false,
            ipv6: true,
        }
    }

    /// Probe the host by binding an ephemeral loopback socket per family.
    ///
    /// A host with IPv6 disabled in the kernel fails the `[::1]:0` bind.
    pub fn detect() -> Self {
        let ipv4 = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).is_ok();
        let ipv6 = UdpSocket::bind((Ipv6Addr::LOCALHOST, 0)).is_ok();
        debug!(ipv4, ipv6, "detected host address families");
        Self { ipv4, ipv6 }
    }

    /// Whether an address of this family can be dialed from here.
    pub fn supports(&self, ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(_) => self.ipv4,
            IpAddr::V6(_) => self.ipv6,
        }
    }
}

/// Family filter implied by the DNS protocol name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsFamily {
    /// `dns` and any other `dns`-prefixed protocol: every family passes.
    Any,
    /// `dns4`: IPv4 results only.
    V4,
    /// `dns6`: IPv6 results only.
    V6,
}

impl DnsFamily {
    /// Map a protocol tag to its filter. `None` for non-DNS protocols.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "dns4" => Some(Self::V4),
            "dns6" => Some(Self::V6),
            t if t.starts_with("dns") => Some(Self::Any),
            _ => None,
        }
    }

    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            Self::Any => true,
            Self::V4 => ip.is_ipv4(),
            Self::V6 => ip.is_ipv6(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V4: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
    const V6: IpAddr = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1));

    #[test]
    fn test_family_from_tag() {
        assert_eq!(DnsFamily::from_tag("dns"), Some(DnsFamily::Any));
        assert_eq!(DnsFamily::from_tag("dns4"), Some(DnsFamily::V4));
        assert_eq!(DnsFamily::from_tag("dns6"), Some(DnsFamily::V6));
        assert_eq!(DnsFamily::from_tag("dnsaddr"), Some(DnsFamily::Any));
        assert_eq!(DnsFamily::from_tag("ip4"), None);
        assert_eq!(DnsFamily::from_tag("tcp"), None);
    }

    #[test]
    fn test_family_matches() {
        assert!(DnsFamily::Any.matches(&V4));
        assert!(DnsFamily::Any.matches(&V6));
        assert!(DnsFamily::V4.matches(&V4));
        assert!(!DnsFamily::V4.matches(&V6));
        assert!(DnsFamily::V6.matches(&V6));
        assert!(!DnsFamily::V6.matches(&V4));
    }

    #[test]
    fn test_capabilities_supports() {
        assert!(HostCapabilities::all().supports(&V4));
        assert!(HostCapabilities::all().supports(&V6));
        assert!(!HostCapabilities::ipv4_only().supports(&V6));
        assert!(!HostCapabilities::ipv6_only().supports(&V4));
    }

    #[test]
    fn test_detect_ipv4_loopback() {
        assert!(HostCapabilities::detect().ipv4);
    }

    #[test]
    fn test_capabilities_partial_config() {
        let caps: HostCapabilities = toml::from_str("ipv6 = false").unwrap();
        assert_eq!(caps, HostCapabilities::ipv4_only());
    }
}
