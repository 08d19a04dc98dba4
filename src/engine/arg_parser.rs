use clap::Parser;
use std::path::{Path, PathBuf};

struct DefaultArgs;

impl DefaultArgs {
    pub const INPUT: &'static str = "-";
    pub const CONFIG_DIR: &'static str = ".";
}

/// Bounded, cancellable CSV ingestion on a worker pool.
#[derive(Clone, Debug, Parser)]
#[command(name = "csvfan")]
#[command(about = "Read CSV with a header row; write one JSON object per data row.")]
pub struct Cli {
    /// CSV file to read. Default (or `-`): stdin.
    #[arg(value_name = "FILE", default_value = DefaultArgs::INPUT)]
    pub input: PathBuf,

    /// Worker threads. Default: one per CPU (or CSVFAN_WORKERS / .csvfan.toml).
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Field delimiter: a single ASCII character, or `tab`.
    #[arg(long, short = 'd')]
    pub delimiter: Option<String>,

    /// Single-threaded, input-ordered; stop at the first bad row.
    #[arg(long, short = 's', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub sequential: Option<bool>,

    /// Exit non-zero if any row failed.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Show a row counter on stderr.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Directory holding `.csvfan.toml` and `.env`. Default: current directory.
    #[arg(long, value_name = "DIR", default_value = DefaultArgs::CONFIG_DIR)]
    pub config_dir: PathBuf,
}

impl Cli {
    pub fn reads_stdin(&self) -> bool {
        self.input == Path::new(DefaultArgs::INPUT)
    }
}
