use std::path::PathBuf;

use clap::Parser;
use meterplan::{Command, execute, init_logging};

#[derive(Parser, Debug)]
#[command(name = "meterplan")]
#[command(about = "Cost-benefit analysis of residential water metering")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.log_file.as_deref(), &args.log_level)?;

    execute(args.command)
}
