//! CLI definition and argument parsing for `sentry-cli`: a thin translator
//! from flags to the five `SentryService` RPCs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};

use sentry_api::proto::sentry_service_client::SentryServiceClient;

#[derive(Parser, Debug)]
#[command(name = "sentry-cli", author, version, about = "sentry-run job client")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a job.
    Start(crate::commands::start::StartArgs),
    /// Send SIGTERM to a running job.
    Stop(crate::commands::stop::StopArgs),
    /// Send SIGKILL to a running job.
    Kill(crate::commands::kill::KillArgs),
    /// Query whether a job is still running.
    Status(crate::commands::status::StatusArgs),
    /// Print (or stream) a job's output.
    Logs(crate::commands::logs::LogsArgs),
    /// List every job the server knows about.
    List(crate::commands::list::ListArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GlobalFlags {
    /// Server address, e.g. `https://127.0.0.1:50051`.
    #[arg(long, global = true, default_value = "https://127.0.0.1:50051")]
    pub server: String,

    /// Client certificate (PEM).
    #[arg(long, global = true, default_value = "certs/client.pem")]
    pub cert: PathBuf,

    /// Client private key (PEM).
    #[arg(long, global = true, default_value = "certs/client-key.pem")]
    pub key: PathBuf,

    /// CA bundle used to verify the server's certificate.
    #[arg(long, global = true, default_value = "certs/ca.pem")]
    pub ca: PathBuf,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalFlags {
    /// Dial the server over mutual TLS and return a ready-to-use client.
    pub async fn connect(&self) -> anyhow::Result<SentryServiceClient<Channel>> {
        let cert = std::fs::read(&self.cert)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", self.cert.display()))?;
        let key = std::fs::read(&self.key)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", self.key.display()))?;
        let ca = std::fs::read(&self.ca)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", self.ca.display()))?;

        let tls = ClientTlsConfig::new()
            .identity(Identity::from_pem(cert, key))
            .ca_certificate(Certificate::from_pem(ca));

        let channel = Endpoint::from_shared(self.server.clone())?
            .tls_config(tls)?
            .connect()
            .await?;

        Ok(SentryServiceClient::new(channel))
    }
}
