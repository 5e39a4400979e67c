mod config;

use std::sync::Arc;

use clap::Parser;
use sentry_api::{RegistryApiAdapter, SentryApiService};
use sentry_core::{JobRegistry, ShutdownCoordinator};
use sentry_observe::init_logger;
use tonic::transport::{Certificate, Identity, Server, ServerTlsConfig};
use tracing::info;

use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "sentry-server", about = "Remote job execution service")]
struct Args {
    /// Path to a TOML config file. Omit to run with built-in defaults.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };

    init_logger(&cfg.logger)?;
    info!(listen = %cfg.listen, "logger initialized");

    let registry = Arc::new(JobRegistry::with_cgroup_root(&cfg.cgroup_root));
    let handler = Arc::new(RegistryApiAdapter::new(registry.clone()));
    let service = SentryApiService::new(handler);

    let tls = load_tls(&cfg)?;
    let shutdown = ShutdownCoordinator::new(registry);

    info!(listen = %cfg.listen, "starting mTLS gRPC server");
    Server::builder()
        .tls_config(tls)?
        .add_service(sentry_api::proto::sentry_service_server::SentryServiceServer::new(service))
        .serve_with_shutdown(cfg.listen, shutdown.wait())
        .await?;

    info!("server stopped accepting connections");
    Ok(())
}

fn load_tls(cfg: &ServerConfig) -> anyhow::Result<ServerTlsConfig> {
    let cert = std::fs::read(&cfg.tls.cert)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", cfg.tls.cert.display()))?;
    let key = std::fs::read(&cfg.tls.key)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", cfg.tls.key.display()))?;
    let client_ca = std::fs::read(&cfg.tls.client_ca)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", cfg.tls.client_ca.display()))?;

    Ok(ServerTlsConfig::new()
        .identity(Identity::from_pem(cert, key))
        .client_ca_root(Certificate::from_pem(client_ca))
        .client_auth_optional(false))
}
