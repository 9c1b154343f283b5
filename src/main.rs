//! mcss - Command-line tool for building stylesheet trees

use std::process::ExitCode;

use multicss::cli;

fn main() -> ExitCode {
    cli::run()
}
