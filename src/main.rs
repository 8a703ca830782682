//! `dotsetup` binary: parses the command line and runs the installer.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use dotsetup::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, "install");
    let log = Arc::new(logging::Logger::new("install"));

    commands::install::run(&args, &log)
}
