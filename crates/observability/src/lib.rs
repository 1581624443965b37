//! Logging for dialaddr binaries.
//!
//! - [`LogArgs`]: clap arguments controlling verbosity and output format
//! - [`init_logging`]: installs the global `tracing` subscriber

mod args;
mod logging;

pub use args::LogArgs;
pub use logging::{build_filter, init_logging};
