//! Nodewarden - node inventory and SSH access provisioning service.
//!
//! This is the main entry point for the nodewarden CLI.

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use cli::{Cli, Commands, ServeArgs};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nodewarden::api::{ApiConfig, ApiServer, AppState};
use nodewarden::config::Config;
use nodewarden::keygen::Keygen;
use nodewarden::repository::{InMemoryConnectionRepository, InMemoryNodeRepository};
use nodewarden::secrets::VaultKeyStore;
use nodewarden::service::{ConnectionService, NodeService, RemoteAccessService};
use nodewarden::ssh::RusshExecutor;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbosity());

    let config = Config::load(cli.config.as_ref()).unwrap_or_else(|e| {
        if cli.verbosity() >= 1 {
            eprintln!("Warning: Failed to load config: {}", e);
        }
        Config::default()
    });

    match &cli.command {
        Commands::Serve(args) => serve(config, args).await,
    }
}

/// Wire the services together and run the API server.
async fn serve(config: Config, args: &ServeArgs) -> Result<()> {
    let nodes = Arc::new(InMemoryNodeRepository::new());
    let connections = Arc::new(InMemoryConnectionRepository::new());

    let keys = Arc::new(
        VaultKeyStore::new(config.vault.clone()).context("Failed to initialize Vault key store")?,
    );
    let keygen = Keygen::new(
        config.keygen.bits,
        config.keygen.passphrase.clone(),
        config.keygen.salt.clone(),
    );
    let ssh = Arc::new(RusshExecutor::new(config.ssh.timeout));

    let state = AppState::new(
        NodeService::new(nodes.clone()),
        ConnectionService::new(
            nodes.clone(),
            connections.clone(),
            keys.clone(),
            keygen.clone(),
        ),
        RemoteAccessService::new(nodes, connections, keys, ssh, keygen),
    );

    let mut api_config = ApiConfig::from(&config.server);
    if let Some(bind) = args.bind {
        api_config = api_config.with_address(bind);
    }

    ApiServer::new(api_config, state)
        .run_with_shutdown(shutdown_signal())
        .await
        .context("API server failed")
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
