//! Resolution of multiaddrs into directly dialable addresses.
//!
//! A multiaddr such as `/dns4/example.com/tcp/443/p2p/<peer>` names its host
//! indirectly. Before a transport can dial it, the `/dns*/` entry has to be
//! replaced with a literal `/ip4/` or `/ip6/` entry, and shorthand markers
//! like `/http` need an explicit `/tcp/<port>`.
//!
//! This crate provides:
//! - [`Resolver`]: shorthand expansion plus DNS expansion with address-family
//!   filtering against the host's [`HostCapabilities`].
//! - Pure helpers for dial decisions: [`is_loopback`], [`with_peer_id`],
//!   [`without_peer_id`], [`peer_id`], [`is_dns_addr`].
//! - The [`NameLookup`] seam, implemented for hickory DNS by [`HickoryLookup`].
//!
//! Nothing here caches lookups, retries, or picks between results; those are
//! left to the dialing layer.

mod addr;
mod capabilities;
mod error;
mod lookup;
mod resolver;

pub use addr::{
    dns_host, expand_shorthand, is_dns_addr, is_loopback, peer_id, with_peer_id, without_peer_id,
};
pub use capabilities::{DnsFamily, HostCapabilities};
pub use error::{IdentityMismatch, ResolveError};
pub use lookup::{HickoryLookup, LookupError, NameLookup};
pub use resolver::Resolver;
