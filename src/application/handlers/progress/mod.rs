//! Progress command handlers.

mod recompute_progress;

pub use recompute_progress::{RecomputeProgressError, RecomputeProgressHandler};
