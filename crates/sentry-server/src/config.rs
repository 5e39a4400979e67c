use std::net::SocketAddr;
use std::path::PathBuf;

use sentry_observe::LoggerConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_LISTEN: &str = "[::]:50051";
const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Top-level server configuration: transport, TLS material, cgroup root,
/// and the embedded logger configuration. Every field carries a default so
/// the server is runnable from `--config` alone, or from no flags at all
/// once certificates are dropped in their conventional locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the mTLS listener binds to.
    pub listen: SocketAddr,
    pub tls: TlsConfig,
    /// Root of the cgroup v2 hierarchy; overridable for test environments
    /// that bind-mount cgroups somewhere other than `/sys/fs/cgroup`.
    pub cgroup_root: PathBuf,
    pub logger: LoggerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.parse().expect("valid default listen addr"),
            tls: TlsConfig::default(),
            cgroup_root: PathBuf::from(DEFAULT_CGROUP_ROOT),
            logger: LoggerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file, falling back to built-in defaults for any
    /// field the file omits.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
        let cfg: Self = toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("failed to parse config {}: {e}", path.display()))?;
        Ok(cfg)
    }
}

/// Mutual-TLS material: server identity plus the CA bundle used to verify
/// client certificates. Paths only — the server reads these at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub client_ca: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert: PathBuf::from("certs/server.pem"),
            key: PathBuf::from("certs/server-key.pem"),
            client_ca: PathBuf::from("certs/ca.pem"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_a_valid_socket_addr() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen.port(), 50051);
    }

    #[test]
    fn toml_overrides_only_named_fields() {
        let text = r#"
            listen = "127.0.0.1:9000"

            [tls]
            cert = "/etc/sentry/server.pem"
            key = "/etc/sentry/server-key.pem"
            client_ca = "/etc/sentry/ca.pem"
        "#;
        let cfg: ServerConfig = toml::from_str(text).unwrap();
        assert_eq!(cfg.listen.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.cgroup_root, PathBuf::from(DEFAULT_CGROUP_ROOT));
        assert_eq!(cfg.tls.cert, PathBuf::from("/etc/sentry/server.pem"));
    }
}
