//! Errors that abort a traversal or an async unit.
//!
//! Almost every failure inside a traversal is contained at the node that
//! caused it: panicking closures fall back to the node's last good layout and
//! contract violations are clamped. Only structural failures surface here.

use brook_core::{Size, ViewId};
use thiserror::Error;

/// A traversal that had to be abandoned. The previous render plan stays
/// current.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The graph nests deeper than the configured limit. Usually a geometry
    /// reader or preference-derived content that keeps producing itself.
    #[error("layout recursion exceeded {max_depth} levels at {id}")]
    DepthExceeded {
        /// Configured limit.
        max_depth: usize,
        /// Node at which the limit was hit.
        id: ViewId,
    },
    /// More measurements than the configured budget were requested.
    #[error("layout needed more than {budget} measurements")]
    BudgetExhausted {
        /// Configured budget.
        budget: usize,
    },
    /// The viewport has a negative, infinite or NaN dimension.
    #[error("viewport {0:?} is not a finite, non-negative size")]
    InvalidViewport(Size),
}

/// Failure to start an async unit.
#[derive(Debug, Error)]
pub enum TaskError {
    /// No executor was configured on the resolver.
    #[error("no spawner configured for task at {0}")]
    NoSpawner(ViewId),
    /// The executor refused the future.
    #[error("failed to spawn task: {0}")]
    Spawn(#[from] futures::task::SpawnError),
    /// The task's action panicked while creating its future.
    #[error("task action at {0} panicked")]
    ActionPanicked(ViewId),
}
