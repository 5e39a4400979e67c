mod cli;
mod commands;

use std::process;

use clap::Parser;
use cli::Cli;
use sentry_observe::{LoggerConfig, LoggerLevel, init_logger};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.global.debug { "debug" } else { "warn" };
    let cfg = LoggerConfig {
        level: LoggerLevel::new(level).expect("static level string is valid"),
        ..Default::default()
    };
    let _ = init_logger(&cfg);

    let result = match cli.command {
        cli::Commands::Start(args) => commands::start::execute(args, &cli.global).await,
        cli::Commands::Stop(args) => commands::stop::execute(args, &cli.global).await,
        cli::Commands::Kill(args) => commands::kill::execute(args, &cli.global).await,
        cli::Commands::Status(args) => commands::status::execute(args, &cli.global).await,
        cli::Commands::Logs(args) => commands::logs::execute(args, &cli.global).await,
        cli::Commands::List(args) => commands::list::execute(args, &cli.global).await,
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        process::exit(1);
    }
}
