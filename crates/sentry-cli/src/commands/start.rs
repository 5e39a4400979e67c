use anyhow::Result;
use clap::Args;

use sentry_api::proto::StartJobRequest;

use crate::cli::GlobalFlags;

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Program to run.
    pub command: String,

    /// Arguments passed to the program.
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,

    /// Verbatim `memory.max` value, e.g. `104857600` or `max`.
    #[arg(long, default_value = "")]
    pub memory_limit: String,

    /// Verbatim `cpu.max` value, e.g. `50000 100000`.
    #[arg(long, default_value = "")]
    pub cpu_limit: String,

    /// Chroot the job into this directory before exec.
    #[arg(long, default_value = "")]
    pub mount: String,

    /// Write bandwidth limit in bytes/sec for `io.max`.
    #[arg(long, default_value = "")]
    pub write_bps: String,

    /// Read bandwidth limit in bytes/sec for `io.max`.
    #[arg(long, default_value = "")]
    pub read_bps: String,
}

pub async fn execute(args: StartArgs, global: &GlobalFlags) -> Result<()> {
    let mut client = global.connect().await?;

    let response = client
        .start_job(StartJobRequest {
            command: args.command,
            command_args: args.args,
            memory_limit: args.memory_limit,
            cpu_limit: args.cpu_limit,
            mount: args.mount,
            write_bps: args.write_bps,
            read_bps: args.read_bps,
        })
        .await?;

    println!("{}", response.into_inner().job_id);
    Ok(())
}
