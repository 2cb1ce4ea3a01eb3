mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use idshield_config::Config;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        cli::Commands::Show { voa, all } => commands::show::handle(&config, &voa, all),
        cli::Commands::Verify {
            voa,
            source,
            changes,
            elapsed,
        } => commands::verify::handle(&config, &voa, source, &changes, elapsed),
        cli::Commands::Render {
            voa,
            input,
            output,
            seed,
        } => commands::render::handle(&config, &voa, &input, output.as_deref(), seed),
        cli::Commands::Exemptions { dir, category } => {
            commands::exemptions::handle(&config, dir, category)
        }
        cli::Commands::Config { path } => commands::config::handle(&config, cli.config, path),
    }
}
