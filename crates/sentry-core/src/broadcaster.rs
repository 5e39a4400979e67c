//! Reads a job's stdout/stderr, appends to history, and fans each chunk out
//! to every subscriber currently attached.
use std::sync::Arc;

use bytes::Bytes;
use sentry_exec::CgroupController;
use sentry_model::{JobState, OutputChunk};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tracing::warn;

use crate::record::JobRecord;

const READ_CHUNK: usize = 32 * 1024;

/// Launch the two reader loops plus the task that waits for both of them
/// to finish, reaps the child, flips job state, and removes the cgroup.
///
/// This outlives registry removal: a stopped or killed job keeps being
/// read here until both pipes report EOF, per the "broadcaster outlives
/// the registration" lifecycle rule.
pub(crate) fn spawn(
    record: Arc<JobRecord>,
    mut child: Child,
    stdout: ChildStdout,
    stderr: ChildStderr,
    cgroup: CgroupController,
) {
    tokio::spawn(async move {
        let stdout_record = record.clone();
        let stderr_record = record.clone();
        let (_, _) = tokio::join!(
            read_loop(stdout_record, stdout, false),
            read_loop(stderr_record, stderr, true),
        );

        let exit_status = match child.wait().await {
            Ok(status) => Some(status),
            Err(err) => {
                warn!(job_id = %record.id, %err, "failed to reap child after streams closed");
                None
            }
        };

        {
            let mut inner = record.inner.lock().await;
            if inner.state == JobState::Running {
                inner.state = JobState::Exited;
            }
            inner.exit_status = exit_status;
        }
        record.exited.notify_waiters();

        if let Err(err) = cgroup.remove() {
            warn!(job_id = %record.id, %err, "cgroup cleanup failed");
        }
    });
}

async fn read_loop<R>(record: Arc<JobRecord>, mut reader: R, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                warn!(job_id = %record.id, %err, is_stderr, "pipe read failed");
                break;
            }
        };

        let chunk: Bytes = Bytes::copy_from_slice(&buf[..n]);
        let mut inner = record.inner.lock().await;
        if is_stderr {
            inner.stderr_history.extend_from_slice(&chunk);
        } else {
            inner.stdout_history.extend_from_slice(&chunk);
        }

        // Fan out under the same lock: a subscriber attaching concurrently
        // either sees this chunk in the replayed history or receives it
        // live, never neither and never both.
        let mut i = 0;
        while i < inner.subscribers.len() {
            let send_result = inner.subscribers[i]
                .send(OutputChunk::new(chunk.clone(), is_stderr))
                .await;
            match send_result {
                Ok(()) => i += 1,
                Err(_) => {
                    inner.subscribers.remove(i);
                }
            }
        }
    }
}
