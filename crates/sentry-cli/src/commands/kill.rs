use anyhow::Result;
use clap::Args;

use sentry_api::proto::KillJobRequest;

use crate::cli::GlobalFlags;

#[derive(Args, Debug)]
pub struct KillArgs {
    /// Id of the job to kill.
    pub job_id: String,
}

pub async fn execute(args: KillArgs, global: &GlobalFlags) -> Result<()> {
    let mut client = global.connect().await?;
    let response = client
        .kill_job(KillJobRequest { job_id: args.job_id })
        .await?
        .into_inner();

    if !response.success {
        anyhow::bail!(response.message);
    }
    println!("killed");
    Ok(())
}
