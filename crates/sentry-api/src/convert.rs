use sentry_model::{JobSummary, Limits, OutputChunk};

use crate::error::ApiError;
use crate::proto;

// ============================================================================
// StartJobRequest -> (command, args, Limits, chroot)
// ============================================================================

/// Empty strings on the wire mean "unset" — the proto schema has no
/// `optional` wrapper for these fields, so an empty string is the only
/// way a client expresses "no limit".
fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

impl From<proto::StartJobRequest> for (String, Vec<String>, Limits, Option<String>) {
    fn from(req: proto::StartJobRequest) -> Self {
        let limits = Limits {
            memory_max: non_empty(req.memory_limit),
            cpu_max: non_empty(req.cpu_limit),
            write_bps: non_empty(req.write_bps),
            read_bps: non_empty(req.read_bps),
        };
        (req.command, req.command_args, limits, non_empty(req.mount))
    }
}

pub(crate) fn validate_start_job_request(req: &proto::StartJobRequest) -> Result<(), ApiError> {
    if req.command.trim().is_empty() {
        return Err(ApiError::InvalidRequest("command cannot be empty".into()));
    }
    Ok(())
}

pub(crate) fn validate_job_id(job_id: &str) -> Result<(), ApiError> {
    if job_id.trim().is_empty() {
        return Err(ApiError::InvalidRequest("job_id cannot be empty".into()));
    }
    Ok(())
}

// ============================================================================
// JobSummary -> proto::JobInfo
// ============================================================================

impl From<JobSummary> for proto::JobInfo {
    fn from(summary: JobSummary) -> Self {
        proto::JobInfo {
            job_id: summary.id.to_string(),
            command: render_command(&summary.command, &summary.args),
            is_running: summary.running,
            memory_limit: summary.limits.memory_max.unwrap_or_default(),
            cpu_limit: summary.limits.cpu_max.unwrap_or_default(),
            mount: summary.chroot.unwrap_or_default(),
            write_bps: summary.limits.write_bps.unwrap_or_default(),
            read_bps: summary.limits.read_bps.unwrap_or_default(),
        }
    }
}

fn render_command(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{command} {}", args.join(" "))
    }
}

// ============================================================================
// OutputChunk -> proto::JobOutput
// ============================================================================

pub(crate) fn chunk_to_job_output(job_id: &str, chunk: OutputChunk) -> proto::JobOutput {
    proto::JobOutput {
        job_id: job_id.to_string(),
        data: chunk.data.to_vec(),
        is_stderr: chunk.is_stderr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_job_request_maps_empty_fields_to_none() {
        let req = proto::StartJobRequest {
            command: "/bin/sh".into(),
            command_args: vec!["-c".into(), "true".into()],
            memory_limit: String::new(),
            cpu_limit: "50000 100000".into(),
            mount: String::new(),
            write_bps: String::new(),
            read_bps: "1048576".into(),
        };

        let (command, args, limits, chroot) = req.into();
        assert_eq!(command, "/bin/sh");
        assert_eq!(args, vec!["-c".to_string(), "true".to_string()]);
        assert_eq!(limits.memory_max, None);
        assert_eq!(limits.cpu_max, Some("50000 100000".to_string()));
        assert_eq!(limits.read_bps, Some("1048576".to_string()));
        assert_eq!(limits.write_bps, None);
        assert_eq!(chroot, None);
    }

    #[test]
    fn job_summary_roundtrips_into_job_info() {
        let summary = JobSummary {
            id: sentry_model::JobId::generate(),
            command: "/bin/echo".into(),
            args: vec!["hi".into()],
            running: true,
            limits: Limits {
                memory_max: Some("1048576".into()),
                ..Default::default()
            },
            chroot: Some("/srv/jail".into()),
        };

        let id_text = summary.id.to_string();
        let info: proto::JobInfo = summary.into();
        assert_eq!(info.job_id, id_text);
        assert_eq!(info.command, "/bin/echo hi");
        assert!(info.is_running);
        assert_eq!(info.memory_limit, "1048576");
        assert_eq!(info.mount, "/srv/jail");
    }
}
