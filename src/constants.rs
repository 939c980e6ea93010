// -
// Configuration sources

/// Environment variable naming an optional configuration file
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Prefix of configuration environment variables, e.g. `OBSERVER__BATCH__FLUSH_DELAY_MS`
pub const CONFIG_ENV_PREFIX: &str = "OBSERVER";

pub(crate) const CONFIG_ENV_SEPARATOR: &str = "__";

// -
// Defaults

/// 0 means "next scheduler turn"
pub(crate) const DEFAULT_FLUSH_DELAY_MS: u64 = 0;
pub(crate) const DEFAULT_DELIVERY_DELAY_MS: u64 = 0;

pub(crate) const DEFAULT_PENDING_WARN_THRESHOLD: usize = 10_000;
pub(crate) const DEFAULT_REGISTRY_WARN_THRESHOLD: usize = 10_000;
