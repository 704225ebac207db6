//! Main CLI application structure

use std::io;

use anyhow::Result;
use clap::Parser;

use super::output::{Output, OutputFormat};
use super::session::{seed_demo, Session};
use super::toggle::EnvToggle;
use crate::repository::TaskRepository;

#[derive(Parser)]
#[command(name = "tracker")]
#[command(author, version, about = "Interactive in-memory task tracker")]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', default_value = "text", env = "TRACKER_FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Start the session with a set of sample tasks
    #[arg(long)]
    pub demo: bool,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("Task tracker starting");

    let mut repo = TaskRepository::new();
    if cli.demo {
        seed_demo(&mut repo)?;
        output.verbose_ctx("demo", "Seeded sample tasks");
    }

    let stdin = io::stdin();
    let toggle = EnvToggle;
    let mut session = Session::new(repo, stdin.lock(), &output, &toggle);
    session.run()?;

    output.verbose("Session ended");
    Ok(())
}
