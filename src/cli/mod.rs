//! Command-line interface for the specsearch binary.

pub mod args;
pub mod commands;

pub use args::{Command, IndexTypeArg, OutputFormat, SpecSearchArgs};
pub use commands::execute_command;
