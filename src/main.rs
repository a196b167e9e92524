use clap::Parser;
use fxcross::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
