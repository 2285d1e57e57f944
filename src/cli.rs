//! CLI argument parsing for xfsbench

use clap::Parser;
use std::path::PathBuf;

/// Action selected by the command line, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Prepare,
    Mount,
    Unmount,
    RunAll,
}

#[derive(Parser, Debug)]
#[command(name = "xfsbench")]
#[command(version)]
#[command(
    about = "Loop-backed XFS file and xattr micro-benchmarks",
    long_about = "Loop-backed XFS file and xattr micro-benchmarks\n\n\
                  sudo xfsbench --prepare --mountpoint /mnt/xfsbench\n\
                  sudo xfsbench --mount --mountpoint /mnt/xfsbench\n\
                  chown user:grp /mnt/xfsbench -R\n\
                  xfsbench --mountpoint /mnt/xfsbench --run-all"
)]
pub struct Cli {
    /// Backing image file
    #[arg(long, value_name = "PATH", default_value = "xfs_loop.img")]
    pub image: PathBuf,

    /// Size of the image created by --prepare, in GiB
    #[arg(long = "image-size-gb", value_name = "GIB", default_value = "5")]
    pub image_size_gb: u64,

    /// Create the sparse image and format it as XFS (root)
    #[arg(long)]
    pub prepare: bool,

    /// Attach the image to a loop device and mount it (root)
    #[arg(long)]
    pub mount: bool,

    /// Unmount and release the loop devices (root)
    #[arg(long)]
    pub unmount: bool,

    /// Mountpoint of the filesystem under test
    #[arg(long, value_name = "DIR", default_value = "/mnt/xfsbench")]
    pub mountpoint: PathBuf,

    /// Run the file and xattr benchmarks
    #[arg(long = "run-all")]
    pub run_all: bool,

    /// Overwrite an existing image with --prepare
    #[arg(long)]
    pub force: bool,

    /// TOML file with benchmark parameters
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Worker threads for the write and read phases
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Write/read block size in bytes
    #[arg(long = "block-size", value_name = "BYTES")]
    pub block_size: Option<u64>,

    /// Files per size class before free-space reduction
    #[arg(long = "target-files", value_name = "N")]
    pub target_files: Option<usize>,

    /// Measured set/get pairs per xattr size
    #[arg(long, value_name = "N")]
    pub iterations: Option<usize>,

    /// Enable debug tracing output (to stderr)
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// The single action to execute, if any was requested
    pub fn action(&self) -> Option<Action> {
        if self.prepare {
            Some(Action::Prepare)
        } else if self.mount {
            Some(Action::Mount)
        } else if self.unmount {
            Some(Action::Unmount)
        } else if self.run_all {
            Some(Action::RunAll)
        } else {
            None
        }
    }

    /// Apply command-line overrides to a loaded configuration
    pub fn apply_overrides(&self, config: &mut crate::config::BenchConfig) {
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(target_files) = self.target_files {
            config.target_files = target_files;
        }
        if let Some(iterations) = self.iterations {
            config.xattr_iterations = iterations;
        }
    }
}
