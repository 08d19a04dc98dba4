//! Application configuration constants.
//! Queue sizing and package-derived names in one place.

use std::sync::OnceLock;

// ---- Package names (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    workers_env_key: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                workers_env_key: format!("{}_WORKERS", pkg.to_uppercase()),
            }
        })
    }

    /// Crate name; also the log filter module and the log line prefix.
    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Per-directory settings file, e.g. `.csvfan.toml`.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable overriding the worker count, e.g. `CSVFAN_WORKERS`.
    pub fn workers_env_key(&self) -> &str {
        &self.workers_env_key
    }
}

// ---- Workers ----

/// Worker count when none is configured: one per rayon thread (logical CPUs unless
/// `RAYON_NUM_THREADS` says otherwise).
pub fn default_workers() -> usize {
    rayon::current_num_threads().max(1)
}

// ---- Queue sizing ----

/// Channel capacities as multiples of the worker count.
pub struct QueuePolicy;

impl QueuePolicy {
    /// Job queue slots per worker. Absorbs bursty reads without unbounded buffering.
    pub const JOBS_PER_WORKER: usize = 2;
    /// Result stream slots per worker.
    pub const RESULTS_PER_WORKER: usize = 1;
}

// ---- Progress ----

/// Rows between progress bar refreshes.
pub const PROGRESS_UPDATE_BATCH_SIZE: usize = 1000;
