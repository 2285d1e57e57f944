//! Capacity planning: how many items fit on the target filesystem
//!
//! Only 95% of the space available to an unprivileged writer is budgeted;
//! the rest absorbs XFS metadata overhead and other consumers.

use crate::error::{BenchError, Result};
use crate::report;
use nix::sys::statvfs::statvfs;
use std::path::Path;

/// Fraction of available space a workload may consume, as a percentage
pub const SAFETY_PERCENT: u128 = 95;

/// Bytes available to unprivileged writers on the filesystem holding `path`
pub fn available_bytes(path: &Path) -> Result<u64> {
    let st = statvfs(path).map_err(|source| BenchError::FreeSpace {
        path: path.to_path_buf(),
        source,
    })?;
    #[allow(clippy::unnecessary_cast)]
    let free = st.blocks_available() as u64 * st.fragment_size() as u64;
    Ok(free)
}

/// `floor(available * 0.95)`, computed without float rounding
pub fn safe_budget(available: u64) -> u64 {
    (available as u128 * SAFETY_PERCENT / 100) as u64
}

/// Largest count `<= desired` whose total size fits in the safe budget
pub fn safe_item_count(available: u64, per_item_size: u64, desired: usize) -> usize {
    if per_item_size == 0 {
        return desired;
    }
    let max_count = safe_budget(available) / per_item_size;
    usize::try_from(max_count).map_or(desired, |max| max.min(desired))
}

/// Diagnostic printed when free space forces a smaller count
pub fn adjust_message(desired_count: usize, actual: usize, free: u64) -> Option<String> {
    (actual < desired_count).then(|| {
        format!(
            "Adjusting file count to {} (limited by free space {})",
            actual,
            report::human_bytes(free)
        )
    })
}

/// Size a workload to the free space at `mountpoint`
///
/// Prints a diagnostic when the count is reduced. A return value of 0
/// means the caller must skip the size class.
pub fn plan(mountpoint: &Path, per_item_size: u64, desired_count: usize) -> Result<usize> {
    let free = available_bytes(mountpoint)?;
    let actual = safe_item_count(free, per_item_size, desired_count);
    if let Some(msg) = adjust_message(desired_count, actual, free) {
        report::diagnostic(msg);
    }
    tracing::debug!(free, per_item_size, desired_count, actual, "capacity plan");
    Ok(actual)
}
