//! Multiaddr resolution: shorthand expansion followed by DNS expansion.

use std::future::Future;
use std::net::IpAddr;
use std::pin::pin;

use libp2p::Multiaddr;
use libp2p::multiaddr::Protocol;
use tracing::{debug, trace, warn};

use crate::addr::{expand_shorthand, find_dns};
use crate::capabilities::HostCapabilities;
use crate::error::ResolveError;
use crate::lookup::{HickoryLookup, NameLookup};

/// Turns multiaddrs into directly dialable ones.
///
/// Holds no state besides the lookup service and the host capabilities, so a
/// single instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Resolver<L = HickoryLookup> {
    lookup: L,
    capabilities: HostCapabilities,
}

impl Resolver<HickoryLookup> {
    /// Resolver using system DNS and probed host capabilities.
    pub fn system() -> Self {
        Self::new(HickoryLookup::new(), HostCapabilities::detect())
    }
}

impl<L: NameLookup> Resolver<L> {
    pub fn new(lookup: L, capabilities: HostCapabilities) -> Self {
        Self {
            lookup,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Resolve a multiaddr into the concrete addresses it stands for.
    ///
    /// `/http` and `/https` get their implied `/tcp/` port. Then the first
    /// `/dns*/` entry is looked up and one address is produced per usable
    /// result, in lookup order, with that entry replaced by `/ip4/` or `/ip6/`.
    /// Addresses without a DNS entry resolve to themselves.
    ///
    /// `cancel` aborts a pending lookup when it completes; the outcome is
    /// [`ResolveError::Cancelled`]. A host with no address of a usable family
    /// yields an empty list.
    pub async fn resolve<C>(
        &self,
        addr: &Multiaddr,
        cancel: C,
    ) -> Result<Vec<Multiaddr>, ResolveError>
    where
        C: Future<Output = ()>,
    {
        let addr = expand_shorthand(addr.clone());

        let Some(entry) = find_dns(&addr) else {
            return Ok(vec![addr]);
        };

        debug!(host = %entry.host, family = ?entry.family, "Resolving DNS multiaddr");

        let ips = tokio::select! {
            biased;

            () = cancel => {
                debug!(host = %entry.host, "DNS resolution cancelled");
                return Err(ResolveError::Cancelled { host: entry.host.clone() });
            }
            result = self.lookup.lookup_ip(&entry.host) => {
                result.map_err(|source| ResolveError::NameResolution {
                    host: entry.host.clone(),
                    source,
                })?
            }
        };

        let resolved: Vec<Multiaddr> = ips
            .into_iter()
            .filter(|ip| {
                let usable = self.capabilities.supports(ip) && entry.family.matches(ip);
                if !usable {
                    trace!(host = %entry.host, ip = %ip, "Dropping resolved address");
                }
                usable
            })
            .map(|ip| replace_entry(&addr, entry.index, ip))
            .collect();

        debug!(
            host = %entry.host,
            resolved_count = resolved.len(),
            "Resolved DNS multiaddr"
        );
        Ok(resolved)
    }

    /// Resolve several multiaddrs, pairing each input with its own outcome.
    ///
    /// Lookups run one after another. Once `cancel` fires, remaining DNS
    /// inputs report [`ResolveError::Cancelled`] without being looked up.
    pub async fn resolve_all<'a, C>(
        &self,
        addrs: impl IntoIterator<Item = &'a Multiaddr>,
        cancel: C,
    ) -> Vec<(Multiaddr, Result<Vec<Multiaddr>, ResolveError>)>
    where
        C: Future<Output = ()>,
    {
        let mut cancel = pin!(cancel);
        let mut cancelled = false;
        let mut outcomes = Vec::new();

        for addr in addrs {
            let result = match find_dns(addr) {
                Some(entry) if cancelled => Err(ResolveError::Cancelled { host: entry.host }),
                _ => self.resolve(addr, cancel.as_mut()).await,
            };

            match &result {
                Ok(resolved) => {
                    trace!(addr = %addr, resolved_count = resolved.len(), "Resolved multiaddr");
                }
                Err(e) => {
                    cancelled |= e.is_cancelled();
                    warn!(addr = %addr, error = %e, "Failed to resolve multiaddr");
                }
            }

            outcomes.push((addr.clone(), result));
        }

        outcomes
    }
}

/// Copy of `addr` with the entry at `index` replaced by a literal IP.
fn replace_entry(addr: &Multiaddr, index: usize, ip: IpAddr) -> Multiaddr {
    addr.iter()
        .enumerate()
        .map(|(i, p)| {
            if i != index {
                return p;
            }
            match ip {
                IpAddr::V4(v4) => Protocol::Ip4(v4),
                IpAddr::V6(v6) => Protocol::Ip6(v6),
            }
        })
        .collect()
}
