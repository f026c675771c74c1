//! Cancellable one-shot stop timer
//!
//! The auto-stop is a deferred callback scheduled after the effective
//! duration. Cancellation is checked before the body executes: a cancelled
//! timer never runs its callback, so a stale stop cannot fire after teardown.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};

/// Handle to a pending deferred callback
pub struct StopTimer {
    cancel_tx: Sender<()>,
}

impl StopTimer {
    /// Schedule `callback` to run once after `delay`
    pub fn schedule<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = bounded::<()>(1);

        thread::spawn(move || {
            // A cancel message (or a dropped handle) wins over the timeout
            if let Err(RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(delay) {
                callback();
            }
        });

        Self { cancel_tx }
    }

    /// Cancel the pending callback
    ///
    /// No-op if the callback already fired or was already cancelled.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.try_send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_timer_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let _timer = StopTimer::schedule(Duration::from_millis(10), move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(100));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let timer = StopTimer::schedule(Duration::from_millis(50), move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel();

        thread::sleep(Duration::from_millis(150));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_double_cancel_is_noop() {
        let timer = StopTimer::schedule(Duration::from_millis(50), || {});
        timer.cancel();
        timer.cancel();
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let timer = StopTimer::schedule(Duration::from_millis(5), || {});
        thread::sleep(Duration::from_millis(50));
        timer.cancel();
    }
}
