use anyhow::Result;
use clap::Args;

use sentry_api::proto::StopJobRequest;

use crate::cli::GlobalFlags;

#[derive(Args, Debug)]
pub struct StopArgs {
    /// Id of the job to stop.
    pub job_id: String,
}

pub async fn execute(args: StopArgs, global: &GlobalFlags) -> Result<()> {
    let mut client = global.connect().await?;
    let response = client
        .stop_job(StopJobRequest { job_id: args.job_id })
        .await?
        .into_inner();

    if !response.success {
        anyhow::bail!(response.message);
    }
    println!("stopped");
    Ok(())
}
