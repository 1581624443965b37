//! Hostname lookup seam and its hickory DNS implementation.

use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use tracing::{debug, warn};

/// Errors from a [`NameLookup`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The name does not exist or has no address records.
    #[error("host not found: {host}")]
    NotFound { host: String },

    /// The lookup itself failed (no reachable nameserver, timeout, malformed reply).
    #[error("DNS lookup for {host} failed: {reason}")]
    Failed { host: String, reason: String },
}

/// Resolves a hostname to every address bound to it.
///
/// Implementations return addresses of both families in the order the
/// underlying service produced them; filtering is done by the caller.
#[async_trait]
pub trait NameLookup: Send + Sync {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, LookupError>;
}

/// [`NameLookup`] backed by hickory DNS.
///
/// Uses the system DNS configuration when it can be read, and hickory's
/// defaults otherwise. Both A and AAAA records are queried.
#[derive(Debug, Clone)]
pub struct HickoryLookup {
    resolver: TokioResolver,
}

impl HickoryLookup {
    pub fn new() -> Self {
        let mut builder = match TokioResolver::builder_tokio() {
            Ok(builder) => builder,
            Err(e) => {
                warn!(error = %e, "failed to read system DNS config, using defaults");
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
            }
        };
        builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        Self {
            resolver: builder.build(),
        }
    }
}

impl Default for HickoryLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameLookup for HickoryLookup {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
        debug!(host = %host, "Querying DNS A/AAAA records");

        let lookup = self.resolver.lookup_ip(host).await.map_err(|e| {
            if e.is_no_records_found() {
                LookupError::NotFound {
                    host: host.to_string(),
                }
            } else {
                LookupError::Failed {
                    host: host.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let addrs: Vec<IpAddr> = lookup.iter().collect();
        debug!(host = %host, count = addrs.len(), "DNS lookup complete");
        Ok(addrs)
    }
}
