//! Lounge CLI entry point.

use std::io::stdout;

use clap::Parser;
use lounge_app::Runtime;
use lounge_cli::{Cli, TerminalDriver};
use lounge_client::RestBackend;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let backend = RestBackend::new(cli.backend_config())?;
    let mut driver = TerminalDriver::new(stdout(), cli.command.script());
    if cli.command.shows_session() {
        driver = driver.with_session_line();
    }

    let mut runtime = Runtime::new(driver, backend);
    runtime.run().await?;

    if runtime.driver().failed() {
        return Err("command did not complete".into());
    }
    Ok(())
}

