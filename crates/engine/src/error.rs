//! The error kinds the engine surfaces (see `SPEC_FULL.md` §7).
//!
//! Per-turn subsystem operations are infallible: null/invalid inputs are
//! no-ops. `WorldError` is only ever produced at construction or export time.

/// Errors produced by [`crate::World::create`] and the export entry points.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A required argument was missing or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The grids or pools could not be allocated.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// An export entry point failed to read or write a file.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
