//! Background rebuild worker
//!
//! Drives the snapshot index's periodic rebuild from a single named worker
//! thread. The worker sleeps one tick interval between rebuilds, wakes
//! early on shutdown, and finishes a rebuild already in progress before
//! exiting. A panic inside one tick is caught and logged; the loop keeps
//! serving subsequent ticks.

use parking_lot::{Condvar, Mutex};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{error, info};

struct WorkerShared {
    shutdown: AtomicBool,
    wakeup_lock: Mutex<()>,
    wakeup: Condvar,
}

/// Handle to the rebuild worker thread. Shuts down and joins on drop.
pub(crate) struct RebuildWorker {
    shared: Arc<WorkerShared>,
    handle: Option<JoinHandle<()>>,
}

impl RebuildWorker {
    /// Spawn the worker. `tick` runs once per `interval` until shutdown.
    pub fn spawn(interval: Duration, tick: impl Fn() + Send + 'static) -> Self {
        let shared = Arc::new(WorkerShared {
            shutdown: AtomicBool::new(false),
            wakeup_lock: Mutex::new(()),
            wakeup: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("podium-rebuild".to_string())
            .spawn(move || {
                info!(
                    interval_ms = interval.as_millis() as u64,
                    "rebuild worker started"
                );
                loop {
                    {
                        let mut slot = worker_shared.wakeup_lock.lock();
                        if !worker_shared.shutdown.load(Ordering::Acquire) {
                            worker_shared.wakeup.wait_for(&mut slot, interval);
                        }
                    }
                    if worker_shared.shutdown.load(Ordering::Acquire) {
                        break;
                    }
                    if std::panic::catch_unwind(AssertUnwindSafe(&tick)).is_err() {
                        error!("rebuild tick panicked; previous snapshot kept, retrying next tick");
                    }
                }
                info!("rebuild worker stopped");
            })
            .expect("failed to spawn rebuild worker thread");
        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Signal shutdown and join the worker. Idempotent.
    pub fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        let _slot = self.shared.wakeup_lock.lock();
        self.shared.wakeup.notify_all();
        drop(_slot);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RebuildWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
