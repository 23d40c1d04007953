use std::{
    sync::{Arc, Mutex, PoisonError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{error::Shutdown, hal::Clock};

const JOIN_POLL: Duration = Duration::from_millis(10);
const STOP_POLL_MS: u64 = 100;

/// Sleeps `ms` in slices short enough to notice `shutdown`. Returns `false`
/// when shutdown was requested.
pub fn sleep_observing(clock: &dyn Clock, shutdown: &Shutdown, ms: u64) -> bool {
    let deadline = clock.now_ms().saturating_add(ms);
    loop {
        if shutdown.is_requested() {
            return false;
        }
        let now = clock.now_ms();
        if now >= deadline {
            return true;
        }
        clock.sleep_ms((deadline - now).min(STOP_POLL_MS));
    }
}

struct Task {
    name: String,
    handle: JoinHandle<()>,
}

#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: Arc<Mutex<Vec<Task>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, name: &str, body: F) -> std::io::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new().name(name.to_string()).spawn(body)?;
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.handle.is_finished());
        tasks.push(Task {
            name: name.to_string(),
            handle,
        });
        Ok(())
    }

    pub fn running(&self) -> Vec<String> {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.handle.is_finished());
        tasks.iter().map(|task| task.name.clone()).collect()
    }

    /// Joins every finished thread, waiting up to `timeout` for the rest.
    /// Returns the names of threads that were still running and have been
    /// abandoned.
    pub fn join_all(&self, timeout: Duration) -> Vec<String> {
        let mut pending = std::mem::take(
            &mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let deadline = Instant::now() + timeout;

        loop {
            let (finished, running): (Vec<Task>, Vec<Task>) = pending
                .into_iter()
                .partition(|task| task.handle.is_finished());
            for task in finished {
                if task.handle.join().is_err() {
                    warn!("background thread {} panicked", task.name);
                } else {
                    debug!("joined background thread {}", task.name);
                }
            }
            pending = running;

            if pending.is_empty() || Instant::now() >= deadline {
                break;
            }
            thread::sleep(JOIN_POLL);
        }

        pending
            .into_iter()
            .map(|task| {
                warn!("background thread {} did not stop in time", task.name);
                task.name
            })
            .collect()
    }
}
