// SPDX-License-Identifier: MIT
mod cli;
mod commands;
mod io;
mod runtime;
mod transcript;

use clap::Parser;
use cli::{AgentCommands, Cli, Commands};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Chat { question, once, no_stream, save, debug } => {
            commands::chat::run(cli.config, question, once, no_stream, save, debug).await
        }
        Commands::Info => commands::info::run(cli.config, cli.output).await,
        Commands::Version => {
            println!("agentflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Setup => commands::setup::run(cli.config),
        Commands::Agent { command: AgentCommands::Export { format, output, ai_description } } => {
            commands::export::run(cli.config, format, output, ai_description).await
        }
    }
}

/// Headless CLI: no TUI display to protect, so logging always goes to
/// stderr rather than being suppressed. `RUST_LOG` takes precedence over
/// `--verbose`/`--quiet` when set.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet { "error" } else if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
