//! Capability seams for the two I/O ends of the pipeline.
//!
//! The pipeline core never touches files or codecs directly. It acquires raw
//! payloads through a [`Load`] capability and hands finished payloads to a
//! [`Persist`] capability, so the orchestration is testable with in-memory
//! fakes and the real image-backed implementations live in [`crate::images`].
//!
//! Failures are returned, never thrown: a failed load or persist is counted
//! against its owning item and the pipeline moves on.

use anyhow::Result;

/// Acquires the raw payload for a single source identifier.
///
/// Called only from the single loader thread, but must be `Send + Sync` so
/// the pipeline can hand it across the thread boundary.
pub trait Load<Id, Raw>: Send + Sync {
    /// Returns the payload for `id`, or an error if the source is
    /// unreadable. The identifier itself stays with the caller; on success
    /// it travels downstream attached to the payload.
    fn load(&self, id: &Id) -> Result<Raw>;
}

/// Writes one finished payload to a durable sink, keyed by its identifier.
///
/// Called only from the single writer thread. A failure marks that item as
/// lost for output purposes; it must not affect later items.
pub trait Persist<Id, Out>: Send + Sync {
    fn persist(&self, id: &Id, payload: Out) -> Result<()>;
}
