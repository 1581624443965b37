//! Pure multiaddr predicates and rewrites.
//!
//! Every rewrite builds a new [`Multiaddr`] rather than editing one in place,
//! so a caller holding the original never observes a change. Inputs that need
//! no rewrite are handed back as-is.

use std::net::{Ipv4Addr, Ipv6Addr};

use libp2p::multiaddr::Protocol;
use libp2p::{Multiaddr, PeerId};

use crate::capabilities::DnsFamily;
use crate::error::IdentityMismatch;

/// Port implied by a bare `/http` entry.
const HTTP_DEFAULT_PORT: u16 = 80;

/// Port implied by a bare `/https` entry.
const HTTPS_DEFAULT_PORT: u16 = 443;

/// The first DNS entry of an address and where it sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DnsEntry {
    pub(crate) index: usize,
    pub(crate) family: DnsFamily,
    pub(crate) host: String,
}

/// Check if a multiaddr points at the loopback interface.
///
/// True if any entry is `/ip4/127.0.0.1` or `/ip6/::1`.
pub fn is_loopback(addr: &Multiaddr) -> bool {
    addr.iter().any(|p| match p {
        Protocol::Ip4(ip) => ip == Ipv4Addr::LOCALHOST,
        Protocol::Ip6(ip) => ip == Ipv6Addr::LOCALHOST,
        _ => false,
    })
}

/// Extract the peer identity (`/p2p/` or legacy `/ipfs/`) from a multiaddr.
pub fn peer_id(addr: &Multiaddr) -> Option<PeerId> {
    addr.iter().find_map(|p| match p {
        Protocol::P2p(id) => Some(id),
        _ => None,
    })
}

/// Bind an address to `peer`.
///
/// An address already carrying `peer` is returned unchanged. One carrying a
/// different identity is rejected; the caller must not dial it as `peer`.
/// Otherwise `/p2p/<peer>` is appended as the outermost entry.
pub fn with_peer_id(addr: Multiaddr, peer: PeerId) -> Result<Multiaddr, IdentityMismatch> {
    match peer_id(&addr) {
        Some(existing) if existing == peer => Ok(addr),
        Some(existing) => Err(IdentityMismatch {
            expected: existing,
            found: peer,
        }),
        None => Ok(addr.with(Protocol::P2p(peer))),
    }
}

/// Strip every peer identity entry from an address.
pub fn without_peer_id(addr: Multiaddr) -> Multiaddr {
    if peer_id(&addr).is_none() {
        return addr;
    }

    addr.iter()
        .filter(|p| !matches!(p, Protocol::P2p(_)))
        .collect()
}

/// Check if a multiaddr has any `/dns*/` entry and so needs a lookup before dialing.
pub fn is_dns_addr(addr: &Multiaddr) -> bool {
    find_dns(addr).is_some()
}

/// Extract the family filter and hostname of the first `/dns*/` entry.
pub fn dns_host(addr: &Multiaddr) -> Option<(DnsFamily, String)> {
    find_dns(addr).map(|entry| (entry.family, entry.host))
}

pub(crate) fn find_dns(addr: &Multiaddr) -> Option<DnsEntry> {
    addr.iter().enumerate().find_map(|(index, p)| {
        let family = DnsFamily::from_tag(p.tag())?;
        let host = match p {
            Protocol::Dns(name)
            | Protocol::Dns4(name)
            | Protocol::Dns6(name)
            | Protocol::Dnsaddr(name) => name.to_string(),
            _ => return None,
        };
        Some(DnsEntry {
            index,
            family,
            host,
        })
    })
}

/// Make the transport port implied by `/http` and `/https` explicit.
///
/// `/http` gains `/tcp/80` and `/https` gains `/tcp/443` directly after the
/// marker, unless a `/tcp/` entry is already present anywhere in the address.
/// The `/https` pass sees the result of the `/http` pass.
pub fn expand_shorthand(addr: Multiaddr) -> Multiaddr {
    let addr = insert_default_tcp(addr, |p| matches!(p, Protocol::Http), HTTP_DEFAULT_PORT);
    insert_default_tcp(addr, |p| matches!(p, Protocol::Https), HTTPS_DEFAULT_PORT)
}

fn insert_default_tcp(
    addr: Multiaddr,
    is_marker: impl Fn(&Protocol<'_>) -> bool,
    port: u16,
) -> Multiaddr {
    let has_tcp = addr.iter().any(|p| matches!(p, Protocol::Tcp(_)));
    if has_tcp || !addr.iter().any(|p| is_marker(&p)) {
        return addr;
    }

    let mut expanded = Multiaddr::empty();
    let mut inserted = false;
    for p in addr.iter() {
        let at_marker = !inserted && is_marker(&p);
        expanded.push(p);
        if at_marker {
            expanded.push(Protocol::Tcp(port));
            inserted = true;
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ma(s: &str) -> Multiaddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback(&ma("/ip4/127.0.0.1/tcp/1234")));
        assert!(is_loopback(&ma("/ip6/::1/tcp/1234")));
        assert!(!is_loopback(&ma("/ip4/10.0.0.1")));
        assert!(!is_loopback(&ma("/ip4/127.0.0.2/tcp/1234")));
        assert!(!is_loopback(&ma("/dns4/localhost/tcp/1234")));
    }

    #[test]
    fn test_is_loopback_scans_every_entry() {
        // Loopback in an inner layer still counts.
        assert!(is_loopback(&ma("/ip4/10.0.0.1/tcp/1/ip6/::1/tcp/2")));
    }

    #[test]
    fn test_with_peer_id_appends() {
        let peer = PeerId::random();
        let addr = ma("/ip4/10.0.0.1/tcp/1634");

        let bound = with_peer_id(addr.clone(), peer).unwrap();
        assert_eq!(bound, ma(&format!("/ip4/10.0.0.1/tcp/1634/p2p/{peer}")));
        assert_eq!(bound.iter().last(), Some(Protocol::P2p(peer)));
    }

    #[test]
    fn test_with_peer_id_same_peer_unchanged() {
        let peer = PeerId::random();
        let addr = ma(&format!("/ip4/10.0.0.1/tcp/1634/p2p/{peer}"));

        assert_eq!(with_peer_id(addr.clone(), peer).unwrap(), addr);
    }

    #[test]
    fn test_with_peer_id_mismatch() {
        let x = PeerId::random();
        let y = PeerId::random();
        let addr = ma(&format!("/ip4/10.0.0.1/tcp/1634/p2p/{x}"));

        let err = with_peer_id(addr, y).unwrap_err();
        assert_eq!(err.expected, x);
        assert_eq!(err.found, y);
    }

    #[test]
    fn test_without_peer_id() {
        let peer = PeerId::random();
        let bare = ma("/ip4/10.0.0.1/tcp/1634");
        let bound = ma(&format!("/ip4/10.0.0.1/tcp/1634/p2p/{peer}"));

        assert_eq!(without_peer_id(bound.clone()), bare);
        assert_eq!(without_peer_id(bare.clone()), bare);
    }

    #[test]
    fn test_without_peer_id_idempotent_and_inverse() {
        let peer = PeerId::random();
        let addr = ma("/dns4/example.com/tcp/443");

        let stripped = without_peer_id(with_peer_id(addr.clone(), peer).unwrap());
        assert_eq!(stripped, addr);
        assert_eq!(without_peer_id(stripped.clone()), stripped);
    }

    #[test]
    fn test_without_peer_id_removes_all_and_legacy() {
        let a = PeerId::random();
        let b = PeerId::random();
        let malformed = ma(&format!("/ip4/10.0.0.1/tcp/1/ipfs/{a}/p2p/{b}"));

        assert_eq!(without_peer_id(malformed), ma("/ip4/10.0.0.1/tcp/1"));
    }

    #[test]
    fn test_peer_id_legacy_alias() {
        let peer = PeerId::random();
        assert_eq!(peer_id(&ma(&format!("/ip4/1.2.3.4/tcp/1/ipfs/{peer}"))), Some(peer));
        assert_eq!(peer_id(&ma("/ip4/1.2.3.4/tcp/1")), None);
    }

    #[test]
    fn test_is_dns_addr() {
        assert!(!is_dns_addr(&ma("/ip4/127.0.0.1/tcp/1634")));
        assert!(is_dns_addr(&ma("/dns/example.com/tcp/1634")));
        assert!(is_dns_addr(&ma("/dns4/example.com/tcp/1634")));
        assert!(is_dns_addr(&ma("/dns6/example.com/tcp/1634")));
        assert!(is_dns_addr(&ma("/dnsaddr/mainnet.ethswarm.org")));
    }

    #[test]
    fn test_is_dns_addr_agrees_with_dns_host() {
        for s in [
            "/ip4/127.0.0.1/tcp/1634",
            "/ip6/::1/tcp/1634",
            "/dns/example.com/tcp/1634",
            "/dns4/example.com/tcp/1634",
            "/dns6/example.com/tcp/1634",
            "/dnsaddr/mainnet.ethswarm.org",
            "/http",
            "/ip4/10.0.0.1/tcp/1/dns6/inner.example",
        ] {
            let addr = ma(s);
            assert_eq!(is_dns_addr(&addr), dns_host(&addr).is_some(), "addr {s}");
        }
    }

    #[test]
    fn test_find_dns_first_entry() {
        let entry = find_dns(&ma("/ip4/1.2.3.4/tcp/1/dns6/a.example/dns4/b.example")).unwrap();
        assert_eq!(entry.index, 2);
        assert_eq!(entry.family, DnsFamily::V6);
        assert_eq!(entry.host, "a.example");

        assert_eq!(
            dns_host(&ma("/dns/example.com/tcp/1")),
            Some((DnsFamily::Any, "example.com".to_string()))
        );
        assert_eq!(dns_host(&ma("/ip4/127.0.0.1/tcp/1634")), None);
    }

    #[test]
    fn test_expand_http() {
        assert_eq!(expand_shorthand(ma("/http")), ma("/http/tcp/80"));
        assert_eq!(
            expand_shorthand(ma("/dns4/example.com/http")),
            ma("/dns4/example.com/http/tcp/80")
        );
    }

    #[test]
    fn test_expand_https() {
        assert_eq!(expand_shorthand(ma("/https")), ma("/https/tcp/443"));
    }

    #[test]
    fn test_expand_existing_tcp_unchanged() {
        assert_eq!(expand_shorthand(ma("/http/tcp/8080")), ma("/http/tcp/8080"));
        assert_eq!(expand_shorthand(ma("/https/tcp/8443")), ma("/https/tcp/8443"));
    }

    #[test]
    fn test_expand_tcp_before_marker_suppresses() {
        // A tcp entry anywhere counts, not only after the marker.
        let addr = ma("/ip4/10.0.0.1/tcp/8080/http");
        assert_eq!(expand_shorthand(addr.clone()), addr);
    }

    #[test]
    fn test_expand_both_markers() {
        // The https pass observes the tcp inserted for http.
        assert_eq!(expand_shorthand(ma("/http/https")), ma("/http/tcp/80/https"));
    }

    #[test]
    fn test_expand_without_markers_unchanged() {
        let addr = ma("/ip4/10.0.0.1/udp/1234/quic-v1");
        assert_eq!(expand_shorthand(addr.clone()), addr);
    }
}
