use anyhow::Result;
use clap::Args;

use sentry_api::proto::ListJobsRequest;

use crate::cli::GlobalFlags;

#[derive(Args, Debug)]
pub struct ListArgs {}

pub async fn execute(_args: ListArgs, global: &GlobalFlags) -> Result<()> {
    let mut client = global.connect().await?;
    let jobs = client
        .list_jobs(ListJobsRequest {})
        .await?
        .into_inner()
        .jobs;

    for job in jobs {
        let state = if job.is_running { "running" } else { "stopped" };
        println!("{}\t{}\t{}", job.job_id, state, job.command);
    }
    Ok(())
}
