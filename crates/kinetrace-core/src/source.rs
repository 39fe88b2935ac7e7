//! Source adapter contract: turning SDK-specific frame state into samples

use crate::sample::Sample;

/// Converts a tracking source's current frame into a normalized [`Sample`].
///
/// Producers push frame state into their adapter however they like (that
/// step is adapter-specific and outside this crate); the pipeline only ever
/// pulls normalized samples out. This interface never fails: an adapter
/// that has not seen a frame yet reports the default sample with every
/// tracking flag false.
pub trait SourceAdapter: Send {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Version of the underlying tracking source or SDK
    fn version(&self) -> &str;

    /// Normalized sample for the current frame at the given timestamp
    fn sample_at(&self, timestamp: f64) -> Sample;
}

/// Adapter with no tracking source behind it; always reports the default
/// untracked sample. Placeholder for hosts without a headset, and a handy
/// test double.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSource;

impl SourceAdapter for NullSource {
    fn name(&self) -> &str {
        "null"
    }

    fn version(&self) -> &str {
        "-"
    }

    fn sample_at(&self, timestamp: f64) -> Sample {
        Sample::at(timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_source_reports_untracked_defaults() {
        let source: Box<dyn SourceAdapter> = Box::new(NullSource);
        let sample = source.sample_at(2.0);
        assert_eq!(sample.timestamp, 2.0);
        assert!(!sample.left.tracked);
        assert!(!sample.right.tracked);
        assert_eq!(sample.head.orientation, [0.0, 0.0, 0.0, 1.0]);
    }
}
