//! Sequential write and read workloads over many files
//!
//! A write task creates one file, fills it with random blocks, flushes it
//! and forces data and metadata to stable storage before closing. A read
//! task streams one file back in fixed-size blocks. Both are scheduled on
//! the bounded pool in [`crate::pool`]; a failing task is logged and
//! recorded as an absent sample instead of aborting the phase.

use crate::error::{BenchError, Result};
use crate::pool;
use crate::report;
use crate::timing::{TaskOutcome, TimingSet};
use rand::RngCore;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One size class sized for the target filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub item_size: u64,
    pub block_size: u64,
    pub item_count: usize,
    pub dest_dir: PathBuf,
}

impl WorkloadSpec {
    /// Paths of the files this workload creates, `f_0.dat` onward
    pub fn file_paths(&self) -> Vec<PathBuf> {
        file_paths(&self.dest_dir, self.item_count)
    }
}

/// Result of one write or read phase
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseResult {
    /// Sum of the successful per-file times
    pub total: Duration,
    /// One entry per scheduled file, `None` for failures
    pub outcomes: Vec<TaskOutcome>,
}

impl PhaseResult {
    fn from_outcomes(outcomes: Vec<TaskOutcome>) -> Self {
        let total: Duration = outcomes.iter().flatten().sum();
        Self { total, outcomes }
    }

    /// Aggregate view over the outcomes
    pub fn timings(&self) -> TimingSet {
        TimingSet::from_outcomes(&self.outcomes)
    }
}

/// Deterministic data file names under `dest_dir`
pub fn file_paths(dest_dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| dest_dir.join(format!("f_{}.dat", i)))
        .collect()
}

/// Write one file of `file_size` bytes in `block_size` chunks
///
/// The payload is generated before the clock starts; the measured interval
/// runs from open to close after `sync_all`.
pub fn write_file(path: &Path, file_size: u64, block_size: u64) -> Result<Duration> {
    let block_len = usize::try_from(block_size.min(file_size).max(1))
        .map_err(|_| BenchError::Config(format!("block size {} too large", block_size)))?;
    let mut block = vec![0u8; block_len];
    rand::thread_rng().fill_bytes(&mut block);

    let start = Instant::now();
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| BenchError::io(path, e))?;
    let mut writer = BufWriter::with_capacity(block_len, file);

    let mut remaining = file_size;
    while remaining > 0 {
        // Bounded by block_len, which fits in usize
        let chunk = remaining.min(block_len as u64) as usize;
        writer
            .write_all(&block[..chunk])
            .map_err(|e| BenchError::io(path, e))?;
        remaining -= chunk as u64;
    }

    let file = writer
        .into_inner()
        .map_err(|e| BenchError::io(path, e.into_error()))?;
    file.sync_all().map_err(|e| BenchError::io(path, e))?;
    drop(file);
    Ok(start.elapsed())
}

/// Read one file to EOF in `block_size` chunks, returning elapsed time and
/// the number of bytes consumed
pub fn read_file(path: &Path, block_size: u64) -> Result<(Duration, u64)> {
    let block_len = usize::try_from(block_size.max(1))
        .map_err(|_| BenchError::Config(format!("block size {} too large", block_size)))?;
    let mut buf = vec![0u8; block_len];

    let start = Instant::now();
    let mut file = File::open(path).map_err(|e| BenchError::io(path, e))?;
    let mut consumed = 0u64;
    loop {
        let n = file.read(&mut buf).map_err(|e| BenchError::io(path, e))?;
        if n == 0 {
            break;
        }
        consumed += n as u64;
    }
    drop(file);
    Ok((start.elapsed(), consumed))
}

/// Create `count` files under `dest_dir` on `concurrency` workers
pub fn run_write(
    dest_dir: &Path,
    count: usize,
    file_size: u64,
    block_size: u64,
    concurrency: usize,
) -> Result<PhaseResult> {
    fs::create_dir_all(dest_dir).map_err(|e| BenchError::io(dest_dir, e))?;
    let paths = file_paths(dest_dir, count);

    let outcomes = pool::run_tasks(&paths, concurrency, |path| {
        isolate("Write", path, write_file(path, file_size, block_size))
    });
    Ok(PhaseResult::from_outcomes(outcomes))
}

/// Read every path back on `concurrency` workers
///
/// A file that does not yield exactly `file_size` bytes counts as a
/// failed read.
pub fn run_read(
    paths: &[PathBuf],
    file_size: u64,
    block_size: u64,
    concurrency: usize,
) -> PhaseResult {
    let outcomes = pool::run_tasks(paths, concurrency, |path| {
        let result = read_file(path, block_size).and_then(|(elapsed, consumed)| {
            if consumed != file_size {
                return Err(BenchError::ShortRead {
                    path: path.clone(),
                    expected: file_size,
                    actual: consumed,
                });
            }
            Ok(elapsed)
        });
        isolate("Read", path, result)
    });
    PhaseResult::from_outcomes(outcomes)
}

/// Turn a task error into an absent sample, reporting it
fn isolate(phase: &str, path: &Path, result: Result<Duration>) -> TaskOutcome {
    match result {
        Ok(elapsed) => {
            tracing::trace!(path = %path.display(), ?elapsed, "{} done", phase);
            Some(elapsed)
        }
        Err(e) => {
            tracing::warn!("{} failed for {}: {}", phase, path.display(), e);
            report::diagnostic(format!("{} worker failed: {}", phase, e));
            None
        }
    }
}
