//! Load `.csvfan.toml` from a directory (CLI only). Lib callers pass `IngestOpts` directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    workers: Option<usize>,
    delimiter: Option<String>,
    sequential: Option<bool>,
    strict: Option<bool>,
    verbose: Option<bool>,
    progress: Option<bool>,
}

/// Load the settings file from `dir`. `Ok(None)` when there is no file; an unreadable or invalid
/// file is an error for the caller to report (the CLI warns and carries on).
pub fn load_file_config(dir: &Path) -> Result<Option<FileConfig>> {
    let path = dir.join(PackagePaths::get().config_filename());
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let file = parse_file_config(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(file))
}

pub fn parse_file_config(s: &str) -> std::result::Result<FileConfig, toml::de::Error> {
    toml::from_str(s)
}

impl FileConfig {
    /// Needed before logging is set up, so exposed on its own.
    pub fn verbose(&self) -> Option<bool> {
        self.settings.verbose
    }
}

/// Single-byte delimiter from a config or CLI string (`","`, `";"`, `"\t"` or `"tab"`).
pub fn parse_delimiter(s: &str) -> Option<u8> {
    match s {
        "\\t" | "tab" => Some(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => s.bytes().next(),
        _ => None,
    }
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $section.$field {
            $opts.$field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before env and CLI.
pub fn apply_file_to_opts(file: &FileConfig, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(workers) = s.workers {
        opts.ingest.workers = workers;
    }
    if let Some(ref d) = s.delimiter {
        match parse_delimiter(d) {
            Some(b) => opts.ingest.delimiter = b,
            None => log::warn!("ignoring delimiter {:?}: must be a single ASCII character", d),
        }
    }
    apply_file_opt!(s, opts, sequential);
    apply_file_opt!(s, opts, strict);
    apply_file_opt!(s, opts, verbose);
    apply_file_opt!(s, opts, progress);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(","), Some(b','));
        assert_eq!(parse_delimiter("tab"), Some(b'\t'));
        assert_eq!(parse_delimiter("\t"), Some(b'\t'));
        assert_eq!(parse_delimiter("::"), None);
        assert_eq!(parse_delimiter("é"), None);
    }

    #[test]
    fn test_partial_file_only_touches_present_fields() {
        let file = parse_file_config("[settings]\nworkers = 3\nstrict = true\n").unwrap();
        let mut opts = Opts::default();
        opts.ingest.delimiter = b';';
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.ingest.workers, 3);
        assert!(opts.strict);
        assert_eq!(opts.ingest.delimiter, b';');
        assert!(!opts.sequential);
    }

    #[test]
    fn test_missing_section_is_empty() {
        let file = parse_file_config("").unwrap();
        let mut opts = Opts::default();
        let before = opts.ingest.workers;
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.ingest.workers, before);
    }
}
