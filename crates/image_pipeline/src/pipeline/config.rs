//! Configuration for pipeline behaviour.
//!
//! `PipelineConfig` stores the parameters that control the pipeline's
//! concurrency shape.
//!
//! Example:
//! ```ignore
//! let config = PipelineConfig::builder()
//!     .num_workers(8)
//!     .channel_capacity(16)
//!     .build();
//! ```
//!
//! # Performance considerations:
//! - `num_workers`: more workers improve throughput on CPU-bound transforms
//!   but add thread overhead
//! - `channel_capacity`: higher values let stages run further ahead of each
//!   other at the cost of more in-flight payload memory

use anyhow::{ensure, Result};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of parallel transform workers.
    pub num_workers: usize,
    /// Capacity of each inter-stage hand-off channel.
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            channel_capacity: 8,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Rejects configurations the pipeline cannot run with.
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.num_workers > 0,
            "Cannot run the pipeline with 0 workers; at least one transform \
             worker must consume the work channel"
        );
        ensure!(
            self.channel_capacity > 0,
            "Cannot run the pipeline with channel_capacity 0; capacity must \
             be > 0 to prevent deadlocks"
        );
        Ok(())
    }
}

/// Builder for PipelineConfig with method chaining.
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the number of transform workers (must be > 0).
    pub fn num_workers(mut self, workers: usize) -> Self {
        self.config.num_workers = workers;
        self
    }

    /// Set the inter-stage channel capacity (must be > 0).
    ///
    /// Any capacity >= 1 is correct; this only tunes backpressure.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.channel_capacity, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chaining() {
        let config = PipelineConfig::builder()
            .num_workers(2)
            .channel_capacity(1)
            .build();
        assert_eq!(config.num_workers, 2);
        assert_eq!(config.channel_capacity, 1);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(PipelineConfig::builder()
            .num_workers(0)
            .build()
            .validate()
            .is_err());
        assert!(PipelineConfig::builder()
            .channel_capacity(0)
            .build()
            .validate()
            .is_err());
    }
}
