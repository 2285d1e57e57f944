//! Loop-backed XFS image management
//!
//! Thin wrappers over `mkfs.xfs`, `losetup`, `mount` and `umount`. Each
//! command is echoed before it runs; a non-zero exit becomes
//! [`BenchError::Command`].

use crate::error::{BenchError, Result};
use nix::unistd::geteuid;
use std::fs::{self, File};
use std::path::Path;
use std::process::Command;

const GIB: u64 = 1024 * 1024 * 1024;

/// Fail with [`BenchError::NotRoot`] unless running as root
pub fn require_root() -> Result<()> {
    if !geteuid().is_root() {
        return Err(BenchError::NotRoot);
    }
    Ok(())
}

/// Run an external command, failing on non-zero exit
pub fn run(program: &str, args: &[&str]) -> Result<()> {
    println!("RUN: {} {}", program, args.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| BenchError::io(program, e))?;
    if !status.success() {
        return Err(BenchError::Command {
            program: program.to_string(),
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Run an external command and capture its stdout
pub fn run_capture(program: &str, args: &[&str]) -> Result<String> {
    println!("RUN: {} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| BenchError::io(program, e))?;
    if !output.status.success() {
        return Err(BenchError::Command {
            program: program.to_string(),
            status: output.status.to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Create a sparse file of `size_gib` GiB and format it as XFS
///
/// An existing image is left untouched unless `force` is set.
pub fn prepare_image(image: &Path, size_gib: u64, force: bool) -> Result<()> {
    require_root()?;
    if image.exists() && !force {
        println!(
            "Image {} already exists. Use --force to overwrite or reuse it.",
            image.display()
        );
        return Ok(());
    }
    println!("Creating sparse file {} of {} GiB", image.display(), size_gib);
    create_sparse(image, image_len(size_gib)?)?;
    let image_arg = image.to_string_lossy();
    run("mkfs.xfs", &["-f", &*image_arg])?;
    println!("Image prepared. You can now mount it with --mount.");
    Ok(())
}

/// Image length in bytes for `size_gib` GiB
pub fn image_len(size_gib: u64) -> Result<u64> {
    size_gib
        .checked_mul(GIB)
        .ok_or_else(|| BenchError::Config(format!("image size {} GiB is too large", size_gib)))
}

/// Create (or truncate) `path` as a sparse file of `len` bytes
pub fn create_sparse(path: &Path, len: u64) -> Result<()> {
    let file = File::create(path).map_err(|e| BenchError::io(path, e))?;
    file.set_len(len).map_err(|e| BenchError::io(path, e))?;
    Ok(())
}

/// Attach `image` to a free loop device and mount it on `mountpoint`
pub fn mount_image(image: &Path, mountpoint: &Path) -> Result<()> {
    require_root()?;
    fs::create_dir_all(mountpoint).map_err(|e| BenchError::io(mountpoint, e))?;
    let image_arg = image.to_string_lossy();
    let mount_arg = mountpoint.to_string_lossy();
    let loop_dev = run_capture("losetup", &["--find", "--show", &*image_arg])?;
    let loop_dev = loop_dev.trim();
    println!("loop device: {}", loop_dev);
    run("mount", &[loop_dev, &*mount_arg])?;
    println!("Mounted {} on {}", image.display(), mountpoint.display());
    Ok(())
}

/// Unmount `mountpoint` and detach every loop device backed by `image`
pub fn unmount_image(mountpoint: &Path, image: &Path) -> Result<()> {
    require_root()?;
    let image_arg = image.to_string_lossy();
    let mount_arg = mountpoint.to_string_lossy();
    run("umount", &[&*mount_arg])?;
    let listing = run_capture("losetup", &["-j", &*image_arg])?;
    for dev in loop_devices(&listing) {
        run("losetup", &["-d", dev])?;
    }
    println!("Unmounted and released loop devices");
    Ok(())
}

/// Device paths from `losetup -j` output (`/dev/loop0: [2049]:123 (img)`)
pub fn loop_devices(listing: &str) -> Vec<&str> {
    listing
        .lines()
        .filter_map(|line| line.split(':').next())
        .map(str::trim)
        .filter(|dev| !dev.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_devices_parses_listing() {
        let listing = "/dev/loop0: [2049]:1234 (/root/xfs_loop.img)\n\
                       /dev/loop3: [2049]:1234 (/root/xfs_loop.img)\n";
        assert_eq!(loop_devices(listing), vec!["/dev/loop0", "/dev/loop3"]);
    }

    #[test]
    fn test_loop_devices_empty_listing() {
        assert!(loop_devices("").is_empty());
        assert!(loop_devices("\n").is_empty());
    }

    #[test]
    fn test_image_len() {
        assert_eq!(image_len(5).unwrap(), 5 * GIB);
        assert_eq!(image_len(0).unwrap(), 0);
        assert!(matches!(image_len(u64::MAX), Err(BenchError::Config(_))));
        assert!(image_len(u64::MAX / GIB + 1).is_err());
    }

    #[test]
    fn test_create_sparse_sets_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img");
        create_sparse(&path, 64 * 1024 * 1024).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 64 * 1024 * 1024);
    }

    #[test]
    fn test_run_reports_failure_status() {
        let err = run("false", &[]).unwrap_err();
        assert!(matches!(err, BenchError::Command { .. }));
    }

    #[test]
    fn test_run_missing_program() {
        let err = run("xfsbench-no-such-program", &[]).unwrap_err();
        assert!(matches!(err, BenchError::Io { .. }));
    }

    #[test]
    fn test_run_capture_stdout() {
        let out = run_capture("echo", &["loop7"]).unwrap();
        assert_eq!(out.trim(), "loop7");
    }
}
