use std::fmt;

/// Lifecycle state held on a job record.
///
/// "Removed" is deliberately not a variant here: a removed job has no
/// record at all (it is gone from the registry map), so the set of states
/// a *live* record can be in is exactly these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Exited,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Running => f.write_str("running"),
            JobState::Exited => f.write_str("exited"),
        }
    }
}
