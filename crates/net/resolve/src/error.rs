//! Error types for address rewriting and resolution.

use libp2p::PeerId;

use crate::lookup::LookupError;

/// The address is already bound to a different peer.
///
/// `expected` is the identity already present in the address, `found` is the
/// identity the caller tried to attach. The address describes another peer and
/// must not be dialed as the intended target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("peer identity mismatch: address is bound to {expected}, got {found}")]
pub struct IdentityMismatch {
    pub expected: PeerId,
    pub found: PeerId,
}

/// Errors from [`Resolver::resolve`](crate::Resolver::resolve).
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The hostname could not be resolved at all.
    ///
    /// A host that resolves, but to no address of the requested family, is
    /// not an error: it produces an empty result.
    #[error("failed to resolve {host}: {source}")]
    NameResolution {
        host: String,
        #[source]
        source: LookupError,
    },

    /// The cancellation signal fired before the lookup completed.
    #[error("resolution of {host} was cancelled")]
    Cancelled { host: String },
}

impl ResolveError {
    /// The hostname the failed resolution was for.
    pub fn host(&self) -> &str {
        match self {
            Self::NameResolution { host, .. } | Self::Cancelled { host } => host,
        }
    }

    /// Whether the caller gave up, as opposed to the name not resolving.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
