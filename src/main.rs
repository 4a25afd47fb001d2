use clap::Parser;
use dualthrust::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
