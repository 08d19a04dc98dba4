//! Progress counter for the CLI (kdam, stderr).

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Counter for an unknown total (rows stream in; no percentage).
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " rows"
    )))
}

/// Update progress bar if available.
/// try_lock so a contended bar never stalls the consumer; it catches up on the next update.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Count one row and push a bar update every `chunk_size` rows.
pub fn report_progress_batched(pb: Option<&ProgressBar>, count: &mut usize, chunk_size: usize) {
    *count += 1;
    if let Some(pb) = pb
        && count.is_multiple_of(chunk_size)
    {
        update_progress_bar(pb, chunk_size);
    }
}

/// Final update for the rows after the last full chunk, then a refresh so the total shows.
pub fn flush_progress_remainder(pb: Option<&ProgressBar>, total: usize, chunk_size: usize) {
    if let Some(pb) = pb {
        let remaining = total % chunk_size;
        if remaining > 0 {
            update_progress_bar(pb, remaining);
        }
        if let Ok(mut bar) = pb.lock() {
            let _ = bar.refresh();
        }
    }
}
