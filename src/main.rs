//! restrictor CLI entry point
//!
//! Exit status:
//! - 0: input accepted (or a listing command succeeded)
//! - 1: input rejected by its restriction
//! - 2: usage, configuration, I/O or definition error
//!
//! All logic is delegated to the CLI module.

use std::process::ExitCode;

use restrictor::cli::{self, Outcome};

fn main() -> ExitCode {
    match cli::run() {
        Ok(Outcome::Valid) => ExitCode::SUCCESS,
        Ok(Outcome::Invalid) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(2)
        }
    }
}
