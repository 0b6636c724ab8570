//! reword: rewrite poor git commit messages
//!
//! Selects commits, generates a better message for each from its diff, and
//! rewrites history for the ones the operator accepts.

use std::process::ExitCode;

use clap::Parser;
use reword::config::Config;

fn main() -> ExitCode {
    let config = Config::parse();
    reword::logging::init(config.log_level());

    match reword::run(&config) {
        Ok(_) => ExitCode::from(reword::EXIT_OK),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(reword::exit_code(&err))
        }
    }
}
