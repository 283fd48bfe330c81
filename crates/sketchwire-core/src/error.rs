//! Error taxonomy and non-fatal notifications.

use thiserror::Error;

/// Errors from raster surface operations.
///
/// These never escalate to the embedding shell as fatal conditions: the
/// operation that needed the surface is skipped for the frame and retried
/// naturally on the next valid one.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The surface cannot be read or written (e.g. zero-sized).
    #[error("raster surface unavailable")]
    Unavailable,
    /// An encoded snapshot string could not be decoded back into pixels.
    #[error("malformed raster snapshot: {0}")]
    BadSnapshot(String),
    /// Encoding the surface into a snapshot string failed.
    #[error("raster snapshot encoding failed: {0}")]
    Encode(String),
}

/// Non-fatal notifications surfaced to the embedding shell.
///
/// None of these are error states. The engine degrades gracefully and the
/// shell decides whether to show anything to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Undo requested at the oldest retained entry.
    NothingToUndo,
    /// Redo requested at the newest entry.
    NothingToRedo,
    /// A recognition gesture did not match any component kind; the shell
    /// should offer manual component selection instead.
    RecognitionMiss,
}
