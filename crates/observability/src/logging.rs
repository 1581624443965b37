//! Global `tracing` subscriber setup.

use eyre::Result;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::LogArgs;

/// Build the log filter from command line arguments.
///
/// Precedence:
/// 1. If `--quiet` is set, only errors are shown
/// 2. Otherwise, start with `RUST_LOG` if set, or the level implied by `-v`
///    (warn by default, since stdout carries results)
/// 3. Apply any custom directives from `--log.filter`
pub fn build_filter(args: &LogArgs) -> EnvFilter {
    if args.quiet {
        return EnvFilter::new("error");
    }

    let base_level = match args.verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base_level));

    if let Some(custom_filter) = &args.filter {
        for directive in custom_filter.split(',') {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                // Subscriber isn't installed yet; this is reported after init.
                Err(_) => continue,
            }
        }
    }

    filter
}

/// Initialize logging based on command line arguments.
///
/// Logs go to stderr so that stdout only carries command output.
pub fn init_logging(args: &LogArgs) -> Result<()> {
    let filter = build_filter(args);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if args.json {
        builder.json().try_init()
    } else {
        builder.without_time().try_init()
    }
    .map_err(|e| eyre::eyre!(e))?;

    if let Some(custom_filter) = &args.filter {
        for directive in custom_filter.split(',') {
            if directive.parse::<tracing_subscriber::filter::Directive>().is_err() {
                warn!(directive = %directive, "ignoring invalid log filter directive");
            }
        }
    }

    Ok(())
}
