use std::sync::atomic::{AtomicBool, Ordering};

use console::Term;

/// Global shutdown flag for graceful termination.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// The flag the run loop checks before each roster row.
pub(crate) fn shutdown_flag() -> &'static AtomicBool {
    &SHUTDOWN_REQUESTED
}

/// Request shutdown.
#[inline]
fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::Release);
}

/// Set up the Ctrl+C handler for graceful shutdown.
///
/// The first Ctrl+C lets the current row finish; the second exits at once.
pub(crate) fn setup_shutdown_handler() {
    tokio::spawn(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            return;
        }

        let is_tty = Term::stdout().is_term();
        if is_tty {
            eprintln!("\n\nShutdown requested, finishing the current repository...");
            eprintln!("Press Ctrl+C again to force quit.");
        } else {
            tracing::warn!("Shutdown requested, finishing the current repository");
        }

        request_shutdown();

        // Wait for second Ctrl+C for force quit
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }

        if is_tty {
            eprintln!("Force quit!");
        }
        std::process::exit(130);
    });
}
