//! Extended attribute set/get latency
//!
//! For every attribute size the engine first runs a warm-up of discarded
//! set+get cycles on the first pool file, then times `iterations` set/get
//! pairs walking the pool round-robin. Each call is timed on its own with
//! the monotonic clock (nanosecond resolution on Linux).
//!
//! Everything here runs on the calling thread. A failed set or get aborts
//! the attribute size it belongs to; other sizes still run.

use crate::error::{BenchError, Result};
use crate::report;
use rand::RngCore;
use std::ffi::CStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Attribute name used for every measurement
pub const ATTR_NAME: &CStr = c"user.bench";

/// Discarded set+get cycles before each attribute size
pub const WARMUP_CYCLES: usize = 50;

/// Upper bound on distinct pre-generated values per attribute size
const VALUE_POOL_MAX: usize = 256;

/// Average latencies for one attribute size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSizeResult {
    pub attr_size: usize,
    /// Measured set/get pairs
    pub iterations: usize,
    pub avg_set: Duration,
    pub avg_get: Duration,
}

impl AttrSizeResult {
    pub fn avg_set_us(&self) -> f64 {
        self.avg_set.as_secs_f64() * 1e6
    }

    pub fn avg_get_us(&self) -> f64 {
        self.avg_get.as_secs_f64() * 1e6
    }
}

/// `fsetxattr(2)` on an open file
pub fn set_xattr(file: &File, name: &CStr, value: &[u8]) -> io::Result<()> {
    // SAFETY: fd is owned by `file`; name is NUL-terminated and value is a
    // live slice of `value.len()` bytes.
    let ret = unsafe {
        libc::fsetxattr(
            file.as_raw_fd(),
            name.as_ptr(),
            value.as_ptr().cast(),
            value.len(),
            0,
        )
    };
    if ret == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// `fgetxattr(2)` into `buf`, returning the value length
pub fn get_xattr(file: &File, name: &CStr, buf: &mut [u8]) -> io::Result<usize> {
    // SAFETY: fd is owned by `file`; buf is writable for `buf.len()` bytes.
    let ret = unsafe {
        libc::fgetxattr(
            file.as_raw_fd(),
            name.as_ptr(),
            buf.as_mut_ptr().cast(),
            buf.len(),
        )
    };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ret as usize)
}

/// Whether the filesystem holding `dir` accepts `user.*` attributes
pub fn supports_user_xattrs(dir: &Path) -> bool {
    let probe = dir.join(".xattr_probe");
    let supported = File::create(&probe)
        .and_then(|f| set_xattr(&f, ATTR_NAME, b"probe"))
        .is_ok();
    let _ = fs::remove_file(&probe);
    supported
}

/// Create `count` single-byte files `x_<i>.dat` under `mountpoint/workdir`
pub fn prepare_xattr_files(mountpoint: &Path, workdir: &str, count: usize) -> Result<PathBuf> {
    let dir = mountpoint.join(workdir);
    fs::create_dir_all(&dir).map_err(|e| BenchError::io(&dir, e))?;
    for i in 0..count {
        let path = dir.join(format!("x_{}.dat", i));
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .custom_flags(libc::O_SYNC)
            .open(&path)
            .map_err(|e| BenchError::io(&path, e))?;
        file.write_all(b"0").map_err(|e| BenchError::io(&path, e))?;
    }
    tracing::debug!(count, dir = %dir.display(), "prepared xattr pool");
    Ok(dir)
}

/// Pool files (`x_*.dat`) in `files_dir`, ordered by index
pub fn list_pool(files_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(files_dir).map_err(|e| BenchError::io(files_dir, e))?;
    let mut indexed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BenchError::io(files_dir, e))?;
        let name = entry.file_name();
        let index = name
            .to_str()
            .and_then(|n| n.strip_prefix("x_"))
            .and_then(|n| n.strip_suffix(".dat"))
            .and_then(|n| n.parse::<usize>().ok());
        if let Some(index) = index {
            indexed.push((index, entry.path()));
        }
    }
    indexed.sort_unstable_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, path)| path).collect())
}

/// Iterations actually run against a pool of `pool_size` files
pub fn effective_iterations(pool_size: usize, iterations: usize) -> usize {
    iterations.min(pool_size)
}

/// Diagnostic printed when the pool forces fewer iterations than requested
pub fn clamp_message(requested: usize, iterations: usize) -> Option<String> {
    (iterations < requested).then(|| {
        format!(
            "Reduced iterations to {} due to file availability.",
            iterations
        )
    })
}

/// Run the xattr benchmark for every size in `attr_sizes`, in order
///
/// Fails only when the pool is empty. Sizes whose set/get fails are
/// reported and left out of the result.
pub fn run_xattr_bench(
    files_dir: &Path,
    attr_sizes: &[usize],
    iterations: usize,
    warmup_cycles: usize,
) -> Result<Vec<AttrSizeResult>> {
    let files = list_pool(files_dir)?;
    if files.is_empty() {
        return Err(BenchError::EmptyPool(files_dir.to_path_buf()));
    }
    let requested = iterations;
    let iterations = effective_iterations(files.len(), requested);
    if let Some(msg) = clamp_message(requested, iterations) {
        report::diagnostic(msg);
    }

    let mut results = Vec::with_capacity(attr_sizes.len());
    for &size in attr_sizes {
        report::diagnostic(format!("Benchmarking xattr size = {} bytes ...", size));
        match bench_attr_size(&files, size, iterations, warmup_cycles) {
            Ok(result) => {
                println!("{}", report::format_xattr_line(&result));
                results.push(result);
            }
            Err(e) => {
                tracing::warn!("xattr size {} aborted: {}", size, e);
                report::diagnostic(format!("Skipping xattr size {}: {}", size, e));
            }
        }
    }
    Ok(results)
}

/// Warm up, then time `iterations` set/get pairs of `size`-byte values
pub fn bench_attr_size(
    files: &[PathBuf],
    size: usize,
    iterations: usize,
    warmup_cycles: usize,
) -> Result<AttrSizeResult> {
    let first = files
        .first()
        .ok_or_else(|| BenchError::EmptyPool(PathBuf::new()))?;
    let mut buf = vec![0u8; size];

    warm_up(first, size, warmup_cycles, &mut buf)?;

    let values = random_values(size, iterations.min(VALUE_POOL_MAX).max(1));
    let mut total_set = Duration::ZERO;
    let mut total_get = Duration::ZERO;

    for i in 0..iterations {
        let path = &files[i % files.len()];
        let value = &values[i % values.len()];
        let file = open_rw(path)?;

        let t1 = Instant::now();
        let set = set_xattr(&file, ATTR_NAME, value);
        let t2 = Instant::now();
        set.map_err(|source| xattr_error("setxattr", path, source))?;
        total_set += t2 - t1;

        let t3 = Instant::now();
        let got = get_xattr(&file, ATTR_NAME, &mut buf);
        let t4 = Instant::now();
        let len = got.map_err(|source| xattr_error("getxattr", path, source))?;
        total_get += t4 - t3;

        verify_value(path, value, &buf, len)?;
    }

    Ok(AttrSizeResult {
        attr_size: size,
        iterations,
        avg_set: average(total_set, iterations),
        avg_get: average(total_get, iterations),
    })
}

/// Check a value read back against the one just set
fn verify_value(path: &Path, expected: &[u8], buf: &[u8], len: usize) -> Result<()> {
    if len != expected.len() {
        return Err(BenchError::XattrLength {
            path: path.to_path_buf(),
            expected: expected.len(),
            actual: len,
        });
    }
    if buf[..len] != *expected {
        return Err(BenchError::XattrValue {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn warm_up(path: &Path, size: usize, cycles: usize, buf: &mut [u8]) -> Result<()> {
    let file = open_rw(path)?;
    let value = vec![b'x'; size];
    for _ in 0..cycles {
        set_xattr(&file, ATTR_NAME, &value).map_err(|e| xattr_error("setxattr", path, e))?;
        get_xattr(&file, ATTR_NAME, buf).map_err(|e| xattr_error("getxattr", path, e))?;
    }
    Ok(())
}

fn random_values(size: usize, count: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let mut v = vec![0u8; size];
            rng.fill_bytes(&mut v);
            v
        })
        .collect()
}

fn open_rw(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| BenchError::io(path, e))
}

fn xattr_error(op: &'static str, path: &Path, source: io::Error) -> BenchError {
    BenchError::Xattr {
        op,
        path: path.to_path_buf(),
        source,
    }
}

fn average(total: Duration, iterations: usize) -> Duration {
    if iterations == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos((total.as_nanos() / iterations as u128) as u64)
}
