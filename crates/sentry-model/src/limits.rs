use serde::{Deserialize, Serialize};

/// Resource limits for a job, interpreted verbatim as cgroup v2 values.
///
/// All fields are optional strings rather than parsed numeric types: this
/// keeps the model forward-compatible with cgroup v2 syntax (`"max"`,
/// `"50000 100000"`, ...) without the core ever needing to understand it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Limits {
    /// Verbatim value for `memory.max`.
    pub memory_max: Option<String>,
    /// Verbatim value for `cpu.max`.
    pub cpu_max: Option<String>,
    /// Write bandwidth in bytes/sec, used to build the `wbps=` term of `io.max`.
    pub write_bps: Option<String>,
    /// Read bandwidth in bytes/sec, used to build the `rbps=` term of `io.max`.
    pub read_bps: Option<String>,
}

impl Limits {
    pub fn is_empty(&self) -> bool {
        self.memory_max.is_none()
            && self.cpu_max.is_none()
            && self.write_bps.is_none()
            && self.read_bps.is_none()
    }

    /// `true` if either I/O bandwidth field is set, i.e. `io.max` must be written.
    pub fn has_io_limit(&self) -> bool {
        self.write_bps.is_some() || self.read_bps.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(Limits::default().is_empty());
    }

    #[test]
    fn has_io_limit_detects_either_field() {
        let mut l = Limits::default();
        assert!(!l.has_io_limit());
        l.write_bps = Some("1048576".into());
        assert!(l.has_io_limit());

        let mut l2 = Limits::default();
        l2.read_bps = Some("1048576".into());
        assert!(l2.has_io_limit());
    }

    #[test]
    fn serde_defaults_missing_fields() {
        let l: Limits = serde_json::from_str("{}").unwrap();
        assert!(l.is_empty());
    }
}
