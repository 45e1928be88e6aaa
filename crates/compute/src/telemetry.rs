//! Tracing setup shared by the binary and the worker pool.

use std::panic;
use std::sync::Once;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::engine::worker;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `debug` or `info` depending on the
/// flag. Debug mode also prints source file and line. Returns `false` when a
/// subscriber was already installed, which makes repeat calls harmless.
pub fn init_tracing(debug: bool) -> bool {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug)
        .try_init()
        .is_ok()
}

/// Replace the panic hook, once per process, with one that keeps worker
/// panics to a single debug line.
///
/// A panic inside a unit is caught and reported by the job wrapper, so the
/// default hook's message and backtrace would only repeat it. Panics on
/// threads that are not analysis workers still go to the previous hook.
/// Returns `true` for the call that installed the hook.
pub fn install_panic_hook() -> bool {
    static INSTALL: Once = Once::new();
    let mut installed = false;
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if worker::is_ready() {
                let location = info
                    .location()
                    .map(|l| format!("{}:{}", l.file(), l.line()))
                    .unwrap_or_default();
                debug!(location = %location, "unit panicked");
            } else {
                previous(info);
            }
        }));
        installed = true;
    });
    installed
}
