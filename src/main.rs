//! Task Tracker - interactive in-memory task management

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = tracker_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
