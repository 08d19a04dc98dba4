//! Environment overrides: process env first, then `.env` in the working directory.

use log::{debug, warn};
use std::path::Path;

use crate::Opts;
use crate::utils::config::PackagePaths;

fn read_key(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn try_env_then_dotenv(key: &str, dir: &Path) -> Option<String> {
    if let Some(s) = read_key(key) {
        return Some(s);
    }
    let env_path = dir.join(".env");
    if env_path.is_file() {
        let _ = dotenvy::from_path(&env_path);
        return read_key(key);
    }
    None
}

/// Worker count from `CSVFAN_WORKERS` (env, then `.env` in `dir`). Unparseable values are
/// warned about and ignored.
pub fn workers_from_env(dir: &Path) -> Option<usize> {
    let key = PackagePaths::get().workers_env_key();
    let raw = try_env_then_dotenv(key, dir)?;
    match raw.parse::<usize>() {
        Ok(n) => {
            debug!("{key}={n}");
            Some(n)
        }
        Err(e) => {
            warn!("ignoring {key}={raw:?}: {e}");
            None
        }
    }
}

/// Apply environment overrides to opts. Call after the file config, before CLI flags.
pub fn apply_env_to_opts(dir: &Path, opts: &mut Opts) {
    if let Some(n) = workers_from_env(dir) {
        opts.ingest.workers = n;
    }
}
