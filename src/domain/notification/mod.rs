//! Event coalescing batch types.
//!
//! Everything here is in-memory only: a pending batch lives from the first
//! event of a quiet-period window until its flush, and is lost on process
//! restart by design.

mod batch;

pub use batch::{BatchKey, EventDescriptor, EventKind, PendingBatch};
