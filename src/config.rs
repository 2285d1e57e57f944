//! Run parameters for a full benchmark
//!
//! Defaults reproduce the standard run: eight file sizes from 4 KiB to
//! 8 MiB written in 4 KiB blocks by a single worker, and thirteen xattr
//! sizes from 8 B to 64 KiB measured over 20000 iterations.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest value Linux accepts for a single extended attribute
pub const XATTR_SIZE_MAX: usize = 65536;

/// Configuration for a `--run-all` invocation
///
/// # Example
/// ```
/// use xfsbench::config::BenchConfig;
///
/// let config = BenchConfig::from_toml_str("threads = 4").unwrap();
/// assert_eq!(config.threads, 4);
/// assert_eq!(config.block_size, 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Per-file sizes in bytes, one table row each
    pub file_sizes: Vec<u64>,

    /// Write/read chunk size in bytes
    pub block_size: u64,

    /// Files created per size class before free-space reduction
    pub target_files: usize,

    /// Worker threads for the write and read phases
    pub threads: usize,

    /// Attribute value sizes in bytes, measured in this order
    pub attr_sizes: Vec<usize>,

    /// Measured set/get pairs per attribute size
    pub xattr_iterations: usize,

    /// Discarded set/get cycles before measuring each attribute size
    pub warmup_cycles: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            file_sizes: vec![
                4 * 1024,
                16 * 1024,
                64 * 1024,
                256 * 1024,
                1024 * 1024,
                2 * 1024 * 1024,
                4 * 1024 * 1024,
                8 * 1024 * 1024,
            ],
            block_size: 4 * 1024,
            target_files: 1000,
            threads: 1,
            attr_sizes: vec![
                8, 16, 32, 64, 128, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65536,
            ],
            xattr_iterations: 20000,
            warmup_cycles: crate::xattr::WARMUP_CYCLES,
        }
    }
}

impl BenchConfig {
    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| BenchError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.file_sizes.is_empty() {
            return Err(BenchError::Config("file_sizes must not be empty".into()));
        }
        if self.file_sizes.contains(&0) {
            return Err(BenchError::Config("file sizes must be non-zero".into()));
        }
        if self.block_size == 0 {
            return Err(BenchError::Config("block_size must be non-zero".into()));
        }
        if self.threads == 0 {
            return Err(BenchError::Config("threads must be >= 1".into()));
        }
        if self.xattr_iterations == 0 {
            return Err(BenchError::Config("xattr_iterations must be >= 1".into()));
        }
        if let Some(size) = self.attr_sizes.iter().find(|&&s| s > XATTR_SIZE_MAX) {
            return Err(BenchError::Config(format!(
                "attribute size {} exceeds the {} byte limit",
                size, XATTR_SIZE_MAX
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.file_sizes.len(), 8);
        assert_eq!(config.file_sizes[7], 8 * 1024 * 1024);
        assert_eq!(config.block_size, 4096);
        assert_eq!(config.target_files, 1000);
        assert_eq!(config.threads, 1);
        assert_eq!(config.attr_sizes.first(), Some(&8));
        assert_eq!(config.attr_sizes.last(), Some(&65536));
        assert_eq!(config.xattr_iterations, 20000);
        assert_eq!(config.warmup_cycles, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BenchConfig::from_toml_str("file_sizes = [4096]\ntarget_files = 3").unwrap();
        assert_eq!(config.file_sizes, vec![4096]);
        assert_eq!(config.target_files, 3);
        assert_eq!(config.xattr_iterations, 20000);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = BenchConfig::from_toml_str("threads = \"many\"").unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "attr_sizes = [8, 16]").unwrap();
        writeln!(file, "xattr_iterations = 5").unwrap();

        let config = BenchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.attr_sizes, vec![8, 16]);
        assert_eq!(config.xattr_iterations, 5);
    }

    #[test]
    fn test_from_missing_file() {
        let err = BenchConfig::from_file(Path::new("/nonexistent/xfsbench.toml")).unwrap_err();
        assert!(matches!(err, BenchError::Io { .. }));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_threads() {
        let mut config = BenchConfig::default();
        config.threads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_block_size() {
        let mut config = BenchConfig::default();
        config.block_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_file_sizes() {
        let mut config = BenchConfig::default();
        config.file_sizes = vec![];
        assert!(config.validate().is_err());

        config.file_sizes = vec![4096, 0];
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_oversized_attribute_rejected() {
        let mut config = BenchConfig::default();
        config.attr_sizes.push(XATTR_SIZE_MAX + 1);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("65537"));
    }
}
