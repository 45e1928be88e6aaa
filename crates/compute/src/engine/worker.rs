//! Per-worker startup.
//!
//! Pool threads do not share the caller's setup, so each one runs
//! [`init_worker`] once from the pool's start handler before taking a job.
//! Worker processes run it once on their main thread.

use std::cell::Cell;

use tracing::debug;

use crate::telemetry;

thread_local! {
    static READY: Cell<bool> = const { Cell::new(false) };
}

/// Prepare the current worker thread. Idempotent per thread: returns `true`
/// on the first call and `false` afterwards.
pub fn init_worker(index: usize, debug: bool) -> bool {
    if READY.with(|ready| ready.replace(true)) {
        return false;
    }
    telemetry::init_tracing(debug);
    telemetry::install_panic_hook();
    debug!(worker = index, "analysis worker ready");
    true
}

/// Whether [`init_worker`] has run on this thread.
pub fn is_ready() -> bool {
    READY.with(|ready| ready.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_runs_once_per_thread() {
        std::thread::spawn(|| {
            assert!(!is_ready());
            assert!(init_worker(0, false));
            assert!(is_ready());
            assert!(!init_worker(0, false));
        })
        .join()
        .unwrap();
    }

    #[test]
    fn threads_are_independent() {
        std::thread::spawn(|| init_worker(1, false)).join().unwrap();
        let fresh = std::thread::spawn(|| init_worker(2, false)).join().unwrap();
        assert!(fresh);
    }
}
