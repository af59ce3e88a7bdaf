//! `curator` binary entry point.
use anyhow::Result;
use clap::Parser;

use curator_repo::{cli, commands, exec, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = logging::Logger::new();
    let mut stdout = std::io::stdout();

    match args.command {
        cli::Command::Plan(opts) => commands::plan::run(&args.global, &opts, &log, &mut stdout),
        cli::Command::Apply(opts) => {
            commands::apply::run(&args.global, &opts, &log, &exec::SystemExecutor)
        }
        cli::Command::Facts => commands::facts::run(&args.global, &mut stdout),
        cli::Command::Version => Ok(commands::version::run(&mut stdout)?),
    }
}
