pub mod config;
pub mod env;
pub mod file_config;
pub mod logger;

pub use config::*;
pub use env::{apply_env_to_opts, workers_from_env};
pub use file_config::{
    FileConfig, apply_file_to_opts, load_file_config, parse_delimiter, parse_file_config,
};
pub use logger::setup_logging;
