//! plankit - project plan registry inspector

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = plankit::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
