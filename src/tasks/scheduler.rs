//! Cache Scheduler
//!
//! The background execution context owned by each cache instance. Runs
//! per-entry expiry timers and the periodic statistics report on a
//! dedicated single-worker tokio runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};

/// Background scheduler of one cache instance.
///
/// Delayed tasks are spawned onto a runtime that belongs to this scheduler
/// alone, so callers never need to be inside a tokio context themselves.
#[derive(Debug)]
pub struct CacheScheduler {
    name: String,
    handle: Handle,
    runtime: Mutex<Option<Runtime>>,
    stopped: AtomicBool,
}

impl CacheScheduler {
    /// Starts the scheduler's worker thread.
    ///
    /// # Arguments
    /// * `name` - Cache name, used for the worker thread name and logs
    pub fn start(name: &str) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(format!("{}-scheduler", name))
            .enable_time()
            .build()
            .map_err(|e| {
                CatalogError::Internal(format!("[{}] failed to start scheduler: {}", name, e))
            })?;

        debug!("[{}] Scheduler started", name);

        Ok(Self {
            name: name.to_string(),
            handle: runtime.handle().clone(),
            runtime: Mutex::new(Some(runtime)),
            stopped: AtomicBool::new(false),
        })
    }

    // == Schedule ==
    /// Runs `task` once after `delay`.
    ///
    /// Returns a handle that cancels the task if it has not fired yet, or
    /// None when the scheduler is already shut down.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> Option<AbortHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_stopped() {
            return None;
        }

        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        Some(join.abort_handle())
    }

    // == Schedule At Fixed Rate ==
    /// Runs `task` after `initial_delay` and then every `period`.
    ///
    /// Ticks missed while the worker was busy are skipped rather than
    /// replayed in a burst.
    pub fn schedule_at_fixed_rate<F>(
        &self,
        initial_delay: Duration,
        period: Duration,
        task: F,
    ) -> Option<AbortHandle>
    where
        F: Fn() + Send + 'static,
    {
        if self.is_stopped() {
            return None;
        }

        let join = self.handle.spawn(async move {
            let start = tokio::time::Instant::now() + initial_delay;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                task();
            }
        });
        Some(join.abort_handle())
    }

    /// Returns true once `shutdown` has begun.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    // == Shutdown ==
    /// Stops all scheduled work.
    ///
    /// A callback that is already running finishes; nothing new starts.
    /// Waits at most `grace` for the worker to stop, then abandons it.
    ///
    /// Returns false if the grace period elapsed. A zero grace cancels
    /// without waiting and returns true. Calling it again is a no-op that
    /// returns true.
    pub fn shutdown(&self, grace: Duration) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return true;
        }
        let Some(runtime) = self.runtime.lock().take() else {
            return true;
        };

        debug!("[{}] Stopping scheduler", self.name);
        let started = Instant::now();

        // The blocking wait must not happen on a thread that drives another
        // runtime, so it moves to a helper thread in that case.
        if Handle::try_current().is_ok() {
            let waiter = std::thread::spawn(move || runtime.shutdown_timeout(grace));
            if waiter.join().is_err() {
                warn!("[{}] Scheduler shutdown thread panicked", self.name);
            }
        } else {
            runtime.shutdown_timeout(grace);
        }

        if !grace.is_zero() && started.elapsed() >= grace {
            warn!(
                "[{}] Scheduler did not stop within {:?}, remaining tasks were cancelled",
                self.name, grace
            );
            false
        } else {
            debug!("[{}] Scheduler stopped", self.name);
            true
        }
    }
}

impl Drop for CacheScheduler {
    fn drop(&mut self) {
        // Never blocks, so it is safe from inside async code.
        if let Some(runtime) = self.runtime.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}
