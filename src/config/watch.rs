use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::constants::DEFAULT_DELIVERY_DELAY_MS;
use crate::constants::DEFAULT_REGISTRY_WARN_THRESHOLD;
use crate::Error;
use crate::Result;

/// Delivery of watch notifications
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Delay before a watch listener is invoked after an intercepted write
    ///
    /// Watch notifications are not coalesced: each write schedules one task
    /// per listener. `0` delivers on the next scheduler turn.
    ///
    /// **Default**: 0
    #[serde(default = "default_delivery_delay_ms")]
    pub delivery_delay_ms: u64,

    /// Registration count above which a warning is logged on each new watch
    ///
    /// Registrations are kept until disposed explicitly; crossing this
    /// threshold usually means containers are dropped without
    /// `WatchRegistry::dispose_container`.
    ///
    /// **Default**: 10000
    #[serde(default = "default_registry_warn_threshold")]
    pub registry_warn_threshold: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            delivery_delay_ms: default_delivery_delay_ms(),
            registry_warn_threshold: default_registry_warn_threshold(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.registry_warn_threshold == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.registry_warn_threshold must be greater than 0".into(),
            )));
        }

        if self.delivery_delay_ms > 60_000 {
            warn!(
                "watch.delivery_delay_ms ({}) is over a minute; watch listeners will lag far behind writes",
                self.delivery_delay_ms
            );
        }

        Ok(())
    }
}

const fn default_delivery_delay_ms() -> u64 {
    DEFAULT_DELIVERY_DELAY_MS
}

const fn default_registry_warn_threshold() -> usize {
    DEFAULT_REGISTRY_WARN_THRESHOLD
}
