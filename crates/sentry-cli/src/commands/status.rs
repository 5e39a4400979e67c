use anyhow::Result;
use clap::Args;

use sentry_api::proto::JobStatusRequest;

use crate::cli::GlobalFlags;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Id of the job to query.
    pub job_id: String,
}

pub async fn execute(args: StatusArgs, global: &GlobalFlags) -> Result<()> {
    let mut client = global.connect().await?;
    let response = client
        .get_job_status(JobStatusRequest { job_id: args.job_id })
        .await?
        .into_inner();

    println!("{}", if response.is_running { "running" } else { "stopped" });
    Ok(())
}
