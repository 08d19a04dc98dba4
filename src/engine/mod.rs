//! CLI side of the crate: argument parsing, config layering, output and progress.

pub mod arg_parser;
pub mod cli;
pub mod output;
pub mod progress;

pub use arg_parser::Cli;
pub use cli::{handle_run, setup_opts};
pub use output::{OutputReport, write_record};
