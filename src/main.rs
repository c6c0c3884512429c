use clap::Parser;
use reclaimer::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
