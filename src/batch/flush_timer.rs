use std::time::Duration;

use tokio::task::JoinHandle;

/// Debounced flush timer: at most one armed timer task at a time
///
/// Arming cancels the previous task and bumps the generation. A task that
/// already got past its last await point when it was cancelled presents a
/// stale generation to [`FlushTimer::fire`] and must do nothing.
#[derive(Debug)]
pub(crate) struct FlushTimer {
    delay: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl FlushTimer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            handle: None,
        }
    }

    pub(crate) fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels the armed task (if any) and returns the generation the next
    /// task must present when it fires.
    pub(crate) fn rearm(&mut self) -> u64 {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub(crate) fn attach(
        &mut self,
        handle: JoinHandle<()>,
    ) {
        self.handle = Some(handle);
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Called by a firing task. Returns false if the task was superseded.
    pub(crate) fn fire(
        &mut self,
        generation: u64,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        // The firing task is the attached one; dropping its handle detaches it.
        self.handle = None;
        true
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}
