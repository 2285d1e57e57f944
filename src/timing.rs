//! Per-operation timing samples and their aggregation
//!
//! Each scheduled task yields a [`TaskOutcome`]: the elapsed time of a
//! successful operation, or `None` when it failed. A [`TimingSet`] keeps the
//! failed count next to the samples so partial failure stays visible.

use std::time::Duration;

/// Result of one scheduled operation (`None` = failed)
pub type TaskOutcome = Option<Duration>;

/// Samples collected for one workload phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingSet {
    /// Elapsed time of every successful operation
    pub samples: Vec<Duration>,
    /// Number of operations that produced no sample
    pub failed: usize,
}

impl TimingSet {
    /// Split outcomes into samples and a failure count
    pub fn from_outcomes(outcomes: &[TaskOutcome]) -> Self {
        let samples: Vec<Duration> = outcomes.iter().flatten().copied().collect();
        let failed = outcomes.len() - samples.len();
        Self { samples, failed }
    }

    /// Number of operations scheduled (successful + failed)
    pub fn attempted(&self) -> usize {
        self.samples.len() + self.failed
    }

    /// Sum of all successful samples
    pub fn total(&self) -> Duration {
        self.samples.iter().sum()
    }

    /// Mean over successful samples, `None` if there are none
    pub fn average(&self) -> Option<Duration> {
        let count = u32::try_from(self.samples.len()).ok()?;
        if count == 0 {
            return None;
        }
        Some(self.total() / count)
    }
}
