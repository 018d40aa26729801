//! studynotes CLI entry point.

use anyhow::Result;
use clap::Parser;
use studynotes::cli::{commands, log_level, Cli, Commands};
use studynotes::config::Settings;
use studynotes::orchestrator::Task;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = log_level(cli.verbose, &settings.general.log_level);

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("studynotes={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Extract { files, output } => {
            commands::run_extract(files, output.as_deref(), &settings)?;
        }

        Commands::Summary { files } => {
            commands::run_generate(Task::Summary, files, &settings).await?;
        }

        Commands::Quiz { files } => {
            commands::run_generate(Task::Quiz, files, &settings).await?;
        }

        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
