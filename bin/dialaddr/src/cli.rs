//! dialaddr CLI entry point.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dialaddr_net_resolve::{
    HickoryLookup, ResolveError, Resolver, is_loopback, with_peer_id, without_peer_id,
};
use dialaddr_observability::{LogArgs, init_logging};
use eyre::Result;
use libp2p::{Multiaddr, PeerId};
use tracing::{debug, error, info, warn};

use crate::config::Config;

/// Resolve multiaddrs into directly dialable addresses.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Logging configuration (applies to all subcommands).
    #[command(flatten)]
    pub(crate) logs: LogArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Resolve multiaddrs, printing one dialable address per line.
    Resolve(ResolveArgs),

    /// Print whether a multiaddr points at the loopback interface.
    Loopback {
        /// Multiaddr to check.
        addr: Multiaddr,
    },

    /// Bind a multiaddr to a peer identity.
    WithPeer {
        /// Multiaddr to bind.
        addr: Multiaddr,
        /// Peer identity to append as `/p2p/<peer>`.
        peer: PeerId,
    },

    /// Strip the peer identity from a multiaddr.
    WithoutPeer {
        /// Multiaddr to strip.
        addr: Multiaddr,
    },
}

/// Arguments for the `resolve` command.
#[derive(Debug, Clone, clap::Args)]
#[command(next_help_heading = "Resolution")]
pub(crate) struct ResolveArgs {
    /// Multiaddrs to resolve.
    ///
    /// dialaddr resolve /dns4/example.com/tcp/443/p2p/PeerID /https
    #[arg(required = true, value_name = "MULTIADDR")]
    pub(crate) addrs: Vec<Multiaddr>,

    /// Treat IPv4 as unavailable on this host.
    #[arg(long)]
    pub(crate) disable_ipv4: bool,

    /// Treat IPv6 as unavailable on this host.
    #[arg(long)]
    pub(crate) disable_ipv6: bool,

    /// Give up on pending lookups after this many seconds [default: 10].
    #[arg(long, value_name = "SECS")]
    pub(crate) timeout: Option<u64>,

    /// Path to a TOML config file.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
}

/// Parse the command line, set up logging and dispatch.
pub(crate) async fn run() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(&cli.logs)?;

    match cli.command {
        Commands::Resolve(args) => resolve(args).await,
        Commands::Loopback { addr } => {
            println!("{}", is_loopback(&addr));
            Ok(())
        }
        Commands::WithPeer { addr, peer } => {
            println!("{}", with_peer_id(addr, peer)?);
            Ok(())
        }
        Commands::WithoutPeer { addr } => {
            println!("{}", without_peer_id(addr));
            Ok(())
        }
    }
}

async fn resolve(args: ResolveArgs) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_args(&args);

    let resolver = match (config.resolver.ipv4, config.resolver.ipv6) {
        (None, None) => Resolver::system(),
        _ => Resolver::new(HickoryLookup::new(), config.resolver.capabilities()),
    };
    debug!(
        capabilities = ?resolver.capabilities(),
        timeout_secs = config.resolver.timeout_secs,
        "Resolver configured"
    );

    let timeout = Duration::from_secs(config.resolver.timeout_secs);
    let cancel = async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Interrupted, cancelling pending lookups"),
            () = tokio::time::sleep(timeout) => warn!(?timeout, "Timed out, cancelling pending lookups"),
        }
    };

    let outcomes = resolver.resolve_all(&args.addrs, cancel).await;
    report_outcomes(&outcomes, &mut std::io::stdout().lock())
}

/// Write every resolved address to `out`, one per line, and fail if any input
/// failed. The error names the first failing multiaddr and its cause.
fn report_outcomes(
    outcomes: &[(Multiaddr, std::result::Result<Vec<Multiaddr>, ResolveError>)],
    out: &mut impl Write,
) -> Result<()> {
    let mut failures = Vec::new();
    for (addr, result) in outcomes {
        match result {
            Ok(resolved) if resolved.is_empty() => {
                warn!(addr = %addr, "No usable addresses for this host");
            }
            Ok(resolved) => {
                for resolved_addr in resolved {
                    writeln!(out, "{resolved_addr}")?;
                }
            }
            Err(e) => {
                error!(addr = %addr, error = %e, "Resolution failed");
                failures.push((addr, e));
            }
        }
    }

    if let Some((addr, e)) = failures.first() {
        eyre::bail!(
            "{} of {} multiaddrs failed to resolve (first: {addr}: {e})",
            failures.len(),
            outcomes.len()
        );
    }
    Ok(())
}
