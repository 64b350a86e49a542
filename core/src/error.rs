//! Errors surfaced by the core data structures.

use thiserror::Error;

/// Failures of the process-wide environment default registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// Defaults can only be registered before the first traversal.
    #[error("environment defaults are sealed; `{key}` must be registered at startup")]
    RegistrySealed {
        /// Name of the key that was being registered.
        key: &'static str,
    },
    /// A key may only be given one default.
    #[error("environment key `{key}` already has a registered default")]
    AlreadyRegistered {
        /// Name of the key that was being registered.
        key: &'static str,
    },
}
