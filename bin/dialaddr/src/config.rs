//! Configuration file handling.
//!
//! Values are resolved with the following priority (highest wins):
//!
//! 1. CLI arguments
//! 2. Config file (TOML)
//! 3. Host detection / defaults

use std::fs;
use std::path::Path;

use dialaddr_net_resolve::HostCapabilities;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::cli::ResolveArgs;

/// Default cancellation deadline for a `resolve` run, in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) resolver: ResolverConfig,
}

/// The `[resolver]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ResolverConfig {
    /// Force IPv4 support on or off. Detected from the host when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) ipv4: Option<bool>,

    /// Force IPv6 support on or off. Detected from the host when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) ipv6: Option<bool>,

    /// Give up on pending lookups after this many seconds.
    pub(crate) timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ipv4: None,
            ipv6: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load from `path`, or use defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Apply CLI overrides.
    pub(crate) fn apply_args(&mut self, args: &ResolveArgs) {
        if args.disable_ipv4 {
            self.resolver.ipv4 = Some(false);
        }
        if args.disable_ipv6 {
            self.resolver.ipv6 = Some(false);
        }
        if let Some(timeout) = args.timeout {
            self.resolver.timeout_secs = timeout;
        }
    }
}

impl ResolverConfig {
    /// Host capabilities with configured overrides applied.
    ///
    /// The host is only probed when at least one family is left unset.
    pub(crate) fn capabilities(&self) -> HostCapabilities {
        match (self.ipv4, self.ipv6) {
            (Some(ipv4), Some(ipv6)) => HostCapabilities { ipv4, ipv6 },
            (ipv4, ipv6) => {
                let detected = HostCapabilities::detect();
                HostCapabilities {
                    ipv4: ipv4.unwrap_or(detected.ipv4),
                    ipv6: ipv6.unwrap_or(detected.ipv6),
                }
            }
        }
    }
}
