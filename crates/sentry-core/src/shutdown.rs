//! Drives the registry-wide teardown on SIGINT/SIGTERM.
use std::sync::Arc;

use tokio::signal::unix::{SignalKind, signal};
use tracing::info;

use crate::registry::JobRegistry;

/// Waits for SIGINT or SIGTERM, then kills every registered job.
///
/// Construction only sets up the signal listeners; call
/// [`ShutdownCoordinator::wait`] from the server's main task and use its
/// return as the cue to stop accepting new connections.
pub struct ShutdownCoordinator {
    registry: Arc<JobRegistry>,
}

impl ShutdownCoordinator {
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves once a termination signal has been handled and every job
    /// has been sent SIGKILL with a best-effort cgroup cleanup attempted.
    pub async fn wait(&self) {
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        }

        self.registry.shutdown_all().await;
        info!("all jobs killed, shutdown complete");
    }
}
