//! Per-stage error aggregation.
//!
//! Every item that fails to load, transform, or persist is counted rather
//! than silently dropped, and the final counts come back to the caller as a
//! [`PipelineReport`]. Individual failures never abort the run; the report
//! is how partial failure surfaces.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Live counters shared by the stage threads for the duration of one run.
#[derive(Debug, Default)]
pub(crate) struct StageCounters {
    pub loaded: AtomicUsize,
    pub load_failures: AtomicUsize,
    pub transformed: AtomicUsize,
    pub transform_failures: AtomicUsize,
    pub written: AtomicUsize,
    pub persist_failures: AtomicUsize,
}

impl StageCounters {
    /// Snapshots the counters into an immutable report.
    ///
    /// Only meaningful once every stage thread has been joined.
    pub fn snapshot(&self) -> PipelineReport {
        PipelineReport {
            loaded: self.loaded.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            transformed: self.transformed.load(Ordering::Relaxed),
            transform_failures: self.transform_failures.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }
}

/// Aggregate outcome of one pipeline run.
///
/// Successes and failures are counted per stage:
/// - `loaded` / `load_failures`: identifiers that produced a work item vs.
///   identifiers dropped because the source was unreadable
/// - `transformed` / `transform_failures`: work items that produced a result
///   vs. items dropped mid-pipeline
/// - `written` / `persist_failures`: results durably written vs. results
///   computed but lost at the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineReport {
    pub loaded: usize,
    pub load_failures: usize,
    pub transformed: usize,
    pub transform_failures: usize,
    pub written: usize,
    pub persist_failures: usize,
}

impl PipelineReport {
    /// Total items dropped at any stage.
    pub fn dropped(&self) -> usize {
        self.load_failures + self.transform_failures + self.persist_failures
    }

    /// True when every enumerated identifier made it all the way to the sink.
    pub fn is_clean(&self) -> bool {
        self.dropped() == 0
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written ({} load, {} transform, {} persist failures)",
            self.written, self.load_failures, self.transform_failures, self.persist_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let counters = StageCounters::default();
        counters.loaded.fetch_add(3, Ordering::Relaxed);
        counters.transform_failures.fetch_add(1, Ordering::Relaxed);
        counters.transformed.fetch_add(2, Ordering::Relaxed);
        counters.written.fetch_add(2, Ordering::Relaxed);

        let report = counters.snapshot();
        assert_eq!(report.loaded, 3);
        assert_eq!(report.transformed, 2);
        assert_eq!(report.written, 2);
        assert_eq!(report.dropped(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_display_summary() {
        let report = PipelineReport {
            loaded: 3,
            transformed: 2,
            transform_failures: 1,
            written: 2,
            ..Default::default()
        };
        assert_eq!(
            report.to_string(),
            "2 written (0 load, 1 transform, 0 persist failures)"
        );
    }
}
