use std::io::Write;

use anyhow::Result;
use clap::Args;

use sentry_api::proto::JobLogsRequest;

use crate::cli::GlobalFlags;

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Id of the job whose output to read.
    pub job_id: String,

    /// Subscribe to live output instead of printing the current history
    /// and exiting; runs until the job exits or the connection is
    /// interrupted (Ctrl-C).
    #[arg(long)]
    pub force: bool,
}

pub async fn execute(args: LogsArgs, global: &GlobalFlags) -> Result<()> {
    let mut client = global.connect().await?;

    if !args.force {
        let logs = client
            .get_job_logs(JobLogsRequest {
                job_id: args.job_id,
            })
            .await?
            .into_inner()
            .logs;
        std::io::stdout().write_all(&logs)?;
        return Ok(());
    }

    let mut stream = client
        .stream_job_logs(JobLogsRequest {
            job_id: args.job_id,
        })
        .await?
        .into_inner();

    while let Some(chunk) = tokio_stream::StreamExt::next(&mut stream).await {
        let chunk = chunk?;
        let mut out: Box<dyn Write> = if chunk.is_stderr {
            Box::new(std::io::stderr())
        } else {
            Box::new(std::io::stdout())
        };
        out.write_all(&chunk.data)?;
    }
    Ok(())
}
