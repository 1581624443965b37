//! dialaddr: resolve multiaddrs into directly dialable addresses.

mod cli;
mod config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    cli::run().await
}
