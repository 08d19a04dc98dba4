//! CLI command handler: parallel ingest by default; --sequential runs the single-threaded path.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use crate::engine::arg_parser::Cli;
use crate::engine::output::{OutputReport, write_record};
use crate::engine::progress::{
    create_counter, flush_progress_remainder, report_progress_batched,
};
use crate::pipeline::CancelToken;
use crate::utils::{
    PROGRESS_UPDATE_BATCH_SIZE, apply_env_to_opts, apply_file_to_opts, load_file_config,
    parse_delimiter, setup_logging,
};
use crate::{Opts, ingest, read_records};

/// Overwrite opts field from a CLI flag when given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $cli.$field {
            $opts.$field = v;
        }
    };
}

fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) -> Result<()> {
    if let Some(n) = cli.workers {
        opts.ingest.workers = n;
    }
    if let Some(ref d) = cli.delimiter {
        opts.ingest.delimiter = parse_delimiter(d)
            .with_context(|| format!("invalid delimiter {d:?}: need one ASCII character"))?;
    }
    apply_cli_opt!(cli, opts, sequential);
    apply_cli_opt!(cli, opts, strict);
    apply_cli_opt!(cli, opts, verbose);
    apply_cli_opt!(cli, opts, progress);
    Ok(())
}

/// Defaults → `.csvfan.toml` → env → flags. Also initialises logging.
pub fn setup_opts(cli: &Cli) -> Result<Opts> {
    let file = load_file_config(&cli.config_dir);
    let file_verbose = file.as_ref().ok().and_then(|f| f.as_ref()?.verbose());
    setup_logging(cli.verbose.or(file_verbose).unwrap_or(false));

    let mut opts = Opts::default();
    match file {
        Ok(Some(f)) => apply_file_to_opts(&f, &mut opts),
        Ok(None) => {}
        Err(e) => warn!("{e:#}; using defaults"),
    }
    apply_env_to_opts(&cli.config_dir, &mut opts);
    apply_cli_to_opts(cli, &mut opts)?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    Ok(opts)
}

fn open_input(cli: &Cli) -> Result<Box<dyn Read + Send>> {
    if cli.reads_stdin() {
        return Ok(Box::new(io::stdin()));
    }
    let f = File::open(&cli.input).with_context(|| format!("open {}", cli.input.display()))?;
    Ok(Box::new(f))
}

/// Sequential: read everything, then write. The first bad row fails the run.
fn run_sequential<W: Write>(
    input: Box<dyn Read + Send>,
    opts: &Opts,
    out: &mut W,
) -> Result<OutputReport> {
    let records = read_records(input, &opts.ingest).context("sequential ingest")?;
    for r in &records {
        write_record(out, r)?;
    }
    Ok(OutputReport {
        written: records.len(),
        failed: 0,
    })
}

/// Parallel: stream outcomes as they arrive. Ctrl+C fires the cancellation token.
fn run_parallel<W: Write>(
    input: Box<dyn Read + Send>,
    opts: &Opts,
    out: &mut W,
) -> Result<OutputReport> {
    let cancel = CancelToken::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || cancel_handler.cancel()).context("set Ctrl+C handler")?;

    let mut stream = ingest(input, &opts.ingest, &cancel)?;
    let bar = opts.progress.then(|| create_counter("Ingesting"));
    let mut report = OutputReport::default();
    let mut seen = 0_usize;
    for outcome in stream.by_ref() {
        match outcome.into_result() {
            Ok(r) => {
                write_record(out, &r)?;
                report.written += 1;
            }
            Err(e) => {
                warn!("{e}");
                report.failed += 1;
            }
        }
        report_progress_batched(bar.as_ref(), &mut seen, PROGRESS_UPDATE_BATCH_SIZE);
    }
    flush_progress_remainder(bar.as_ref(), seen, PROGRESS_UPDATE_BATCH_SIZE);

    let summary = stream.finish()?;
    if summary.panicked > 0 {
        anyhow::bail!("{} pipeline thread(s) panicked", summary.panicked);
    }
    if summary.cancelled {
        out.flush().context("flush output")?;
        anyhow::bail!(
            "Ingest cancelled by user; {} records were written",
            report.written
        );
    }
    Ok(report)
}

/// Run ingest on the configured input and write JSON lines to stdout.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli)?;
    let input = open_input(cli)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let report = if opts.sequential {
        run_sequential(input, &opts, &mut out)?
    } else {
        run_parallel(input, &opts, &mut out)?
    };
    out.flush().context("flush output")?;

    info!(
        "{} records written, {} rows failed",
        report.written, report.failed
    );
    if opts.strict && report.failed > 0 {
        anyhow::bail!("strict mode: {} rows failed", report.failed);
    }
    Ok(())
}
