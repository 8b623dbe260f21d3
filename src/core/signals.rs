//! Signal-driven Transition Triggers
//!
//! Turns process signals into transition requests for the supervisor:
//! SIGHUP asks for a reload, SIGINT/SIGTERM/SIGQUIT (or Ctrl-C) ask for a
//! teardown. A second shutdown signal exits immediately with status 130.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Transition requested from outside the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TriggerRequest {
    /// Replace the module set with a fresh one
    Reload,
    /// Deactivate everything and stop
    Teardown,
}

/// What to do with a shutdown signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownAction {
    Teardown,
    ForceExit,
}

fn on_shutdown_signal(count: &AtomicUsize) -> ShutdownAction {
    if count.fetch_add(1, Ordering::AcqRel) == 0 {
        ShutdownAction::Teardown
    } else {
        ShutdownAction::ForceExit
    }
}

/// Queue a teardown, waiting for room behind any pending reloads
///
/// If the supervisor has gone away the shutdown is forgotten, so the next
/// signal tries again instead of force-exiting.
async fn deliver_teardown(count: &AtomicUsize, tx: &mpsc::Sender<TriggerRequest>) {
    if tx.send(TriggerRequest::Teardown).await.is_err() {
        log::warn!("Teardown request not delivered; supervisor is not running");
        count.fetch_sub(1, Ordering::AcqRel);
    }
}

fn forward_shutdown(count: &Arc<AtomicUsize>, tx: &mpsc::Sender<TriggerRequest>, source: &str) {
    match on_shutdown_signal(count) {
        ShutdownAction::Teardown => {
            log::info!("{} received; tearing down modules", source);
            // Delivered from its own task so this signal stream keeps
            // listening for a forced exit while the queue is full
            let count = Arc::clone(count);
            let tx = tx.clone();
            tokio::spawn(async move { deliver_teardown(&count, &tx).await });
        }
        ShutdownAction::ForceExit => {
            log::warn!("{} received again; exiting", source);
            std::process::exit(130);
        }
    }
}

/// Installed signal handlers feeding a trigger channel
#[derive(Debug, Clone)]
pub struct SignalTrigger {
    shutdown_count: Arc<AtomicUsize>,
}

impl SignalTrigger {
    /// Install handlers; must be called from within a tokio runtime
    pub fn install(tx: mpsc::Sender<TriggerRequest>) -> Self {
        let shutdown_count = Arc::new(AtomicUsize::new(0));

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            // Restore default SIGPIPE so piping output into `head` ends quietly
            unsafe {
                libc::signal(libc::SIGPIPE, libc::SIG_DFL);
            }

            let reload_tx = tx.clone();
            tokio::spawn(async move {
                let Ok(mut hangup) = signal(SignalKind::hangup()) else {
                    log::warn!("Could not install SIGHUP handler; reload on signal disabled");
                    return;
                };
                while hangup.recv().await.is_some() {
                    log::info!("SIGHUP received; reloading modules");
                    if reload_tx.send(TriggerRequest::Reload).await.is_err() {
                        break;
                    }
                }
            });

            let shutdown_signals = [
                (SignalKind::interrupt(), "SIGINT"),
                (SignalKind::terminate(), "SIGTERM"),
                (SignalKind::quit(), "SIGQUIT"),
            ];
            for (kind, name) in shutdown_signals {
                let tx = tx.clone();
                let count = Arc::clone(&shutdown_count);
                tokio::spawn(async move {
                    if let Ok(mut sig) = signal(kind) {
                        while sig.recv().await.is_some() {
                            forward_shutdown(&count, &tx, name);
                        }
                    }
                });
            }
        }

        // Fallback for terminals where the unix signals above are not delivered
        {
            let count = Arc::clone(&shutdown_count);
            tokio::spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    forward_shutdown(&count, &tx, "Ctrl-C");
                }
            });
        }

        Self { shutdown_count }
    }

    /// Whether a shutdown signal has been received
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_count.load(Ordering::Acquire) > 0
    }
}
