//! xfsbench - micro-benchmarks for a loop-backed XFS filesystem
//!
//! This library sizes file workloads to the free space of a mounted
//! filesystem, times sequential write/read across many files on a bounded
//! worker pool, and measures extended-attribute set/get latency.

pub mod capacity;
pub mod cli;
pub mod config;
pub mod error;
pub mod image;
pub mod pool;
pub mod report;
pub mod runner;
pub mod timing;
pub mod workload;
pub mod xattr;

pub use error::{BenchError, Result};
