use colored::Colorize;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use std::io::Write;

use crate::utils::config::PackagePaths;

/// Init stderr logging: our crate at Info (Debug when `verbose`), dependencies at Warn.
///
/// Always stderr, since stdout carries the JSON records. Debug lines and problems are tagged with
/// the pipeline stage that logged them (`worker`, `dispatch`, ...); several stage threads log at
/// once, so the tag is the only way to tell them apart. Later calls are no-ops.
pub fn setup_logging(verbose: bool) {
    let pkg = PackagePaths::get().pkg_name();
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module(pkg, level)
        .format(move |buf, record| {
            let stage = stage_of(record.target());
            let args = record.args();
            match record.level() {
                Level::Error => writeln!(
                    buf,
                    "[{} {} {}] {}",
                    pkg.cyan(),
                    "ERROR".red(),
                    stage.white(),
                    args
                ),
                Level::Warn => writeln!(
                    buf,
                    "[{} {} {}] {}",
                    pkg.cyan(),
                    "WARN".yellow(),
                    stage.white(),
                    args
                ),
                Level::Info => writeln!(buf, "[{}] {}", pkg.cyan(), args),
                Level::Debug | Level::Trace => {
                    writeln!(buf, "[{} {}] {}", pkg.cyan(), stage.dimmed(), args)
                }
            }
        })
        .try_init();
}

/// Last path segment of a log target: `csvfan::pipeline::worker` → `worker`.
fn stage_of(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}
