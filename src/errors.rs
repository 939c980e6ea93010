//! Error types for the fallible edges of the crate.
//!
//! Container and watch operations never fail: misuse (absent listener,
//! unwatching an unknown key, watching a locked key, deleting an absent key)
//! is absorbed as a no-op. Only configuration loading and change-kind parsing
//! can return an [`Error`].

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unknown change kind name (expected `add`, `update` or `delete`)
    #[error("Invalid change kind: {0}")]
    InvalidChangeKind(String),
}
