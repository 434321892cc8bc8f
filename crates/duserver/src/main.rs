use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use duindex::MemProviderBuilder;
use duserver::cli::{Cli, Command, ServerArgs};
use duserver::Server;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Server(args) => run_server(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("run duserver failed: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run_server(args: ServerArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = args.resolve_config()?;
    config.server.validate()?;

    let builder = MemProviderBuilder::from_report_file(&args.dufile, config.index.build_options())?
        .cache_capacity(config.cache.capacity)
        .cache_ttl(config.cache.ttl());
    let provider = tokio::task::spawn_blocking(move || builder.build()).await??;
    tracing::info!(
        "loaded {} ({} nodes)",
        args.dufile.display(),
        provider.build_summary().nodes
    );

    let mut server = Server::start(
        &config.server.bind_addr(),
        Arc::new(provider),
        config.server.auth.clone(),
    )
    .await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown()?;
    Ok(())
}
