//! xconfig CLI - inspect and edit plugin configuration files

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = xconfig::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
