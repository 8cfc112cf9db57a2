//! specsearch CLI binary.

use clap::Parser;
use specsearch::cli::{args::SpecSearchArgs, commands::execute_command};
use std::process;

fn main() {
    // Parse command line arguments using clap
    let args = SpecSearchArgs::parse();

    // Execute the command
    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
