//! Uploader contract: shipping flushed batches to a remote collector

use crate::config::SessionConfig;
use crate::sample::Sample;

/// Capability interface for the transport behind the pipeline.
///
/// Every operation is synchronous from the caller's point of view and
/// reports failure through its boolean return rather than panicking; the
/// flush path treats transport failure as loggable and non-fatal.
/// Implementations may run their own execution context internally (the
/// HTTP uploader drives a private async runtime) but must not retain the
/// borrowed sample slice beyond the call.
pub trait Uploader: Send {
    /// Prepare the transport and establish a session identifier
    fn initialize(&mut self, config: &SessionConfig) -> bool;

    /// Register the session with the collector
    fn create_session(&mut self, device_description: &str) -> bool;

    /// Transmit one flushed batch. `filename_hint` is the backup filename
    /// the batch corresponds to, for logging and correlation. An empty
    /// batch returns `false` without performing any I/O.
    fn upload_frame_batch(&mut self, samples: &[Sample], filename_hint: &str) -> bool;

    /// Release transport resources; no further calls are expected
    fn shutdown(&mut self);

    /// Session identifier, or `"no_session"` before initialization
    fn session_id(&self) -> &str;
}
