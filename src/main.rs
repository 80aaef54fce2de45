use clap::Parser;
use botsim::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
