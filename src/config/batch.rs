use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::constants::DEFAULT_FLUSH_DELAY_MS;
use crate::constants::DEFAULT_PENDING_WARN_THRESHOLD;
use crate::Error;
use crate::Result;

/// Change batching of observable containers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Delay between the last mutation of a burst and the flush
    ///
    /// Every mutation that produces a change record restarts the delay
    /// (debounce). `0` flushes on the next scheduler turn.
    ///
    /// **Default**: 0
    #[serde(default = "default_flush_delay_ms")]
    pub flush_delay_ms: u64,

    /// Pending batch size above which a warning is logged on each enqueue
    ///
    /// A batch this large usually means the flush never gets a chance to run
    /// (no async runtime, or a writer that never yields).
    ///
    /// **Default**: 10000
    #[serde(default = "default_pending_warn_threshold")]
    pub pending_warn_threshold: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            flush_delay_ms: default_flush_delay_ms(),
            pending_warn_threshold: default_pending_warn_threshold(),
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pending_warn_threshold == 0 {
            return Err(Error::Config(ConfigError::Message(
                "batch.pending_warn_threshold must be greater than 0".into(),
            )));
        }

        if self.flush_delay_ms > 60_000 {
            warn!(
                "batch.flush_delay_ms ({}) is over a minute; listeners will lag far behind mutations",
                self.flush_delay_ms
            );
        }

        Ok(())
    }
}

const fn default_flush_delay_ms() -> u64 {
    DEFAULT_FLUSH_DELAY_MS
}

const fn default_pending_warn_threshold() -> usize {
    DEFAULT_PENDING_WARN_THRESHOLD
}
