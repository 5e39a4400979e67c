use std::process::ExitStatus;
use std::sync::Arc;

use nix::sys::signal::kill;
use nix::unistd::Pid;
use sentry_model::{JobId, JobState, Limits, OutputChunk};
use tokio::sync::{Mutex, Notify, mpsc};

/// Mutable state touched only by the broadcaster's two readers and by a
/// stream attach — everything else on [`JobRecord`] is set once at start
/// and never changes.
pub(crate) struct JobInner {
    pub stdout_history: Vec<u8>,
    pub stderr_history: Vec<u8>,
    pub subscribers: Vec<mpsc::Sender<OutputChunk>>,
    pub state: JobState,
    pub exit_status: Option<ExitStatus>,
}

impl JobInner {
    fn new() -> Self {
        Self {
            stdout_history: Vec::new(),
            stderr_history: Vec::new(),
            subscribers: Vec::new(),
            state: JobState::Running,
            exit_status: None,
        }
    }
}

/// Everything the registry and the broadcaster share about one job.
///
/// Identity fields (`id`, `command`, `args`, `limits`, `chroot`, `pid`) are
/// set once at construction and read freely without locking. Everything
/// the broadcaster mutates lives behind `inner`, a single per-job lock —
/// held across a chunk's append-then-fan-out and across history replay on
/// stream attach, which is what keeps the two atomic with respect to each
/// other.
pub struct JobRecord {
    pub id: JobId,
    pub command: String,
    pub args: Vec<String>,
    pub limits: Limits,
    pub chroot: Option<String>,
    pub pid: i32,
    pub(crate) inner: Mutex<JobInner>,
    pub(crate) exited: Notify,
}

impl JobRecord {
    pub(crate) fn new(
        id: JobId,
        command: String,
        args: Vec<String>,
        limits: Limits,
        chroot: Option<String>,
        pid: i32,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            command,
            args,
            limits,
            chroot,
            pid,
            inner: Mutex::new(JobInner::new()),
            exited: Notify::new(),
        })
    }

    /// Best-effort liveness probe: sends signal 0 to the pid. Racy by
    /// construction (the pid could be reaped between the check and the
    /// caller acting on it) — documented as such rather than hidden.
    pub fn is_alive(&self) -> bool {
        kill(Pid::from_raw(self.pid), None).is_ok()
    }
}
