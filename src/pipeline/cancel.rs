//! One-shot cancellation token that can be raced against channel operations in `select!`.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct Inner {
    cancelled: AtomicBool,
    /// Never sent on; dropped to disconnect the channel.
    trigger: Mutex<Option<Sender<()>>>,
}

/// Caller-owned stop signal shared by the dispatcher, the workers and the stream.
///
/// Clones share the same state. [`cancel`](Self::cancel) flips a flag and drops the only sender of
/// an internal channel, so `recv(token.receiver())` in a `select!` becomes ready for every
/// waiting thread at once.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
    rx: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded::<()>(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(tx)),
            }),
            rx,
        }
    }

    /// Fire the token. Idempotent; only the first call has any effect.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let sender = match self.inner.trigger.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(sender);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Receiver that becomes ready (disconnected) once the token fires. Use in `select!`:
    /// `recv(token.receiver()) -> _ => { /* cancelled */ }`.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::select;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_idempotent_and_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_cancel_wakes_blocked_select() {
        let token = CancelToken::new();
        let (_tx, rx) = bounded::<u32>(0);
        let waiter = {
            let token = token.clone();
            thread::spawn(move || {
                select! {
                    recv(rx) -> _ => false,
                    recv(token.receiver()) -> _ => true,
                }
            })
        };
        thread::sleep(Duration::from_millis(20));
        token.cancel();
        assert!(waiter.join().unwrap());
    }
}
