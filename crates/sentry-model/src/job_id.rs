use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Opaque, unique-per-service-lifetime job identifier.
///
/// Backed by a time-ordered UUID (v7): uniqueness is the only hard
/// requirement, but ordering by creation time is a useful side effect for
/// logs and `list()` output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh, never-before-used id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl FromStr for JobId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ModelError::InvalidJobId("job id is empty".into()));
        }
        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = JobId::generate();
        let b = JobId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn from_str_rejects_empty() {
        assert!("".parse::<JobId>().is_err());
        assert!("   ".parse::<JobId>().is_err());
    }

    #[test]
    fn display_roundtrips_through_from_str() {
        let id = JobId::generate();
        let text = id.to_string();
        let parsed: JobId = text.parse().unwrap();
        assert_eq!(id, parsed);
    }
}
