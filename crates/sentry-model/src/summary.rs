use crate::{JobId, Limits};

/// The `list()` / `status()` projection of a job record: enough to answer
/// an RPC without handing out the live record itself.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub id: JobId,
    pub command: String,
    pub args: Vec<String>,
    pub running: bool,
    pub limits: Limits,
    pub chroot: Option<String>,
}
