//! Full benchmark run: file workloads, then the xattr engine
//!
//! A size class that cannot run (no space, no samples, statvfs failure) is
//! reported and skipped; the run carries on with the next one.

use crate::capacity;
use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::report::{self, FileSizeRow};
use crate::workload::{self, WorkloadSpec};
use crate::xattr::{self, AttrSizeResult};
use std::path::Path;
use std::time::Instant;

/// Directory under the mountpoint holding the xattr pool
pub const XATTR_WORKDIR: &str = "xattr_files";

/// Run every file size class and return the rows that completed
pub fn run_file_benchmarks(mountpoint: &Path, config: &BenchConfig) -> Vec<FileSizeRow> {
    let mut rows = Vec::with_capacity(config.file_sizes.len());
    for &size in &config.file_sizes {
        match run_size_class(mountpoint, size, config) {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("size class {} skipped: {}", size, e);
                report::diagnostic(format!(
                    "Skipping {} files: {}",
                    report::human_readable_size(size),
                    e
                ));
            }
        }
    }
    rows
}

/// Plan, write and read back one size class
///
/// Returns `Ok(None)` when there is no room for a single file.
pub fn run_size_class(
    mountpoint: &Path,
    size: u64,
    config: &BenchConfig,
) -> Result<Option<FileSizeRow>> {
    let count = capacity::plan(mountpoint, size, config.target_files)?;
    if count == 0 {
        report::diagnostic(format!("Skipping: no space for {} B files.", size));
        return Ok(None);
    }

    let spec = WorkloadSpec {
        item_size: size,
        block_size: config.block_size,
        item_count: count,
        dest_dir: mountpoint.join(format!("write_{}", size)),
    };
    report::diagnostic(format!(
        "--- Testing {} files (count={}) ---",
        report::human_readable_size(size),
        count
    ));

    let write_start = Instant::now();
    let write = workload::run_write(
        &spec.dest_dir,
        spec.item_count,
        spec.item_size,
        spec.block_size,
        config.threads,
    )?;
    let write_timings = write.timings();
    tracing::info!(
        size,
        wall = ?write_start.elapsed(),
        total = ?write.total,
        failed = write_timings.failed,
        "write phase done"
    );
    report_failures("write", write_timings.failed, write_timings.attempted());

    let read_start = Instant::now();
    let read = workload::run_read(
        &spec.file_paths(),
        spec.item_size,
        spec.block_size,
        config.threads,
    );
    let read_timings = read.timings();
    tracing::info!(
        size,
        wall = ?read_start.elapsed(),
        total = ?read.total,
        failed = read_timings.failed,
        "read phase done"
    );
    report_failures("read", read_timings.failed, read_timings.attempted());

    FileSizeRow::from_phases(size, &write_timings, &read_timings).map(Some)
}

fn report_failures(phase: &str, failed: usize, attempted: usize) {
    if failed > 0 {
        report::diagnostic(format!(
            "{} of {} {} operations failed; averaging over the rest",
            failed, attempted, phase
        ));
    }
}

/// Prepare the xattr pool and measure every attribute size
pub fn run_xattr_benchmarks(mountpoint: &Path, config: &BenchConfig) -> Result<Vec<AttrSizeResult>> {
    if !xattr::supports_user_xattrs(mountpoint) {
        report::diagnostic(format!(
            "Skipping xattr benchmarks: {} does not support user xattrs",
            mountpoint.display()
        ));
        return Ok(Vec::new());
    }
    let files_dir = xattr::prepare_xattr_files(mountpoint, XATTR_WORKDIR, config.xattr_iterations)?;
    xattr::run_xattr_bench(
        &files_dir,
        &config.attr_sizes,
        config.xattr_iterations,
        config.warmup_cycles,
    )
}

/// The `--run-all` action
pub fn run_all(mountpoint: &Path, config: &BenchConfig) -> Result<()> {
    config.validate()?;
    if !mountpoint.is_dir() {
        return Err(BenchError::io(
            mountpoint,
            std::io::Error::new(std::io::ErrorKind::NotFound, "mountpoint is not a directory"),
        ));
    }

    report::banner("FILE WRITE BENCHMARKS");
    let rows = run_file_benchmarks(mountpoint, config);
    println!("\n");
    print!("{}", report::render_file_table(&rows));
    println!("Benchmarks completed successfully.\n");

    report::banner("XATTR BENCHMARKS");
    if let Err(e) = run_xattr_benchmarks(mountpoint, config) {
        tracing::warn!("xattr phase failed: {}", e);
        report::diagnostic(format!("Skipping xattr benchmarks: {}", e));
    }

    println!("\nAll benchmarks completed.\n");
    Ok(())
}
