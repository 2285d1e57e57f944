//! Report aggregation and text output
//!
//! Progress and diagnostic lines carry the `[xfsbench]` prefix; result
//! tables are printed bare so they can be copied as-is.

use crate::error::{BenchError, Result};
use crate::timing::TimingSet;
use crate::xattr::AttrSizeResult;
use std::fmt::Display;

const MIB: f64 = 1024.0 * 1024.0;

/// Width of the separator lines around the file table
pub const TABLE_WIDTH: usize = 78;

pub const TABLE_HEADER: &str =
    "Size          Write (us)   Write (MB/s)   Read (us)    Read (MB/s)";

/// Print a progress or diagnostic line
pub fn diagnostic(msg: impl Display) {
    println!("[xfsbench] {}", msg);
}

/// Compact size for diagnostics, e.g. `4.9G`
pub fn human_bytes(n: u64) -> String {
    let mut n = n as f64;
    for unit in ["B", "K", "M", "G"] {
        if n.abs() < 1024.0 {
            return format!("{:3.1}{}", n, unit);
        }
        n /= 1024.0;
    }
    format!("{:3.1}T", n)
}

/// Whole-unit size for table rows, e.g. `256 KB`
pub fn human_readable_size(n: u64) -> String {
    const K: u64 = 1024;
    if n < K {
        format!("{} B", n)
    } else if n < K * K {
        format!("{} KB", n / K)
    } else if n < K * K * K {
        format!("{} MB", n / (K * K))
    } else {
        format!("{} GB", n / (K * K * K))
    }
}

/// One row of the file table
#[derive(Debug, Clone, PartialEq)]
pub struct FileSizeRow {
    pub size: u64,
    pub write_us: f64,
    pub write_mbps: f64,
    pub read_us: f64,
    pub read_mbps: f64,
}

impl FileSizeRow {
    /// Build a row from the write and read timings of one size class
    ///
    /// Fails with [`BenchError::NoSamples`] if either phase has no
    /// successful operation.
    pub fn from_phases(size: u64, write: &TimingSet, read: &TimingSet) -> Result<Self> {
        let (write_us, write_mbps) = latency_and_throughput(size, write, "write")?;
        let (read_us, read_mbps) = latency_and_throughput(size, read, "read")?;
        Ok(Self {
            size,
            write_us,
            write_mbps,
            read_us,
            read_mbps,
        })
    }
}

fn latency_and_throughput(size: u64, set: &TimingSet, phase: &'static str) -> Result<(f64, f64)> {
    let avg = set.average().ok_or(BenchError::NoSamples {
        phase,
        attempted: set.attempted(),
    })?;
    let secs = avg.as_secs_f64();
    let mbps = if secs > 0.0 {
        (size as f64 / MIB) / secs
    } else {
        f64::INFINITY
    };
    Ok((secs * 1e6, mbps))
}

/// Render the file table, separators included
pub fn render_file_table(rows: &[FileSizeRow]) -> String {
    let separator = "-".repeat(TABLE_WIDTH);
    let mut out = String::new();
    out.push_str(TABLE_HEADER);
    out.push('\n');
    out.push_str(&separator);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{:<12}  {:>10.2}   {:>12.2}   {:>10.2}   {:>12.2}\n",
            human_readable_size(row.size),
            row.write_us,
            row.write_mbps,
            row.read_us,
            row.read_mbps
        ));
    }
    out.push_str(&separator);
    out.push('\n');
    out
}

/// One result line for an attribute size
pub fn format_xattr_line(result: &AttrSizeResult) -> String {
    format!(
        "attr_size={:5} B  avg_set={:8.3} µs  avg_get={:8.3} µs",
        result.attr_size,
        result.avg_set_us(),
        result.avg_get_us()
    )
}

/// Print a section banner
pub fn banner(title: &str) {
    println!("\n============================");
    println!("  {}", title);
    println!("============================\n");
}
