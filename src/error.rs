//! Error taxonomy for the benchmark harness
//!
//! Library code returns [`Result`]; the binary wraps everything in
//! `anyhow::Result` at the top level.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while sizing, running or reporting a benchmark
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read free space of {path}: {source}")]
    FreeSpace {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },

    #[error("No files found in {0}")]
    EmptyPool(PathBuf),

    #[error("{op} failed on {path}: {source}")]
    Xattr {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("getxattr on {path} returned {actual} bytes, expected {expected}")]
    XattrLength {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("getxattr on {path} returned a value different from the one set")]
    XattrValue { path: PathBuf },

    #[error("Read {actual} bytes from {path}, expected {expected}")]
    ShortRead {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("All {attempted} {phase} operations failed")]
    NoSamples { phase: &'static str, attempted: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Command `{program}` failed with {status}")]
    Command { program: String, status: String },

    #[error("This operation requires root (for losetup/mkfs/mount). Rerun with sudo.")]
    NotRoot,
}

impl BenchError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type used throughout the harness
pub type Result<T> = std::result::Result<T, BenchError>;
