//! Builds and launches the child process for a job.
use std::os::unix::process::CommandExt as _;
use std::process::Stdio;

use tokio::process::{Child, ChildStderr, ChildStdout, Command};

use crate::error::{ExecError, ExecResult};

/// A freshly spawned child together with its piped output streams.
///
/// Stdout/stderr are taken out of the `Child` up front so the caller never
/// has to worry about the handles being `None` later.
pub struct SpawnedChild {
    pub child: Child,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

/// Spawn `command` in its own process group, with stdout/stderr piped and,
/// if `chroot` is set, the child's root filesystem confined to that path
/// before exec.
///
/// The process group (rather than the default of sharing the parent's) is
/// what lets `kill`/`stop` reach any children the job itself forks, and
/// keeps a signal sent to the parent from also reaching the job.
pub fn spawn_job(command: &str, args: &[String], chroot: Option<&str>) -> ExecResult<SpawnedChild> {
    let mut cmd = Command::new(command);
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null())
        .process_group(0);

    if let Some(root) = chroot {
        let root = root.to_string();
        unsafe {
            cmd.pre_exec(move || {
                let c_root = std::ffi::CString::new(root.as_str())
                    .map_err(|_| std::io::Error::from_raw_os_error(libc::EINVAL))?;
                if libc::chroot(c_root.as_ptr()) != 0 {
                    return Err(std::io::Error::last_os_error());
                }
                if libc::chdir(c"/".as_ptr()) != 0 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }

    let mut child = cmd.spawn().map_err(ExecError::SpawnFailed)?;
    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");

    Ok(SpawnedChild {
        child,
        stdout,
        stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawns_and_captures_output() {
        let mut spawned = spawn_job("echo", &["hello".to_string()], None).expect("spawn");
        let status = spawned.child.wait().await.expect("wait");
        assert!(status.success());
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let result = spawn_job("definitely-not-a-real-binary", &[], None);
        assert!(matches!(result, Err(ExecError::SpawnFailed(_))));
    }
}
