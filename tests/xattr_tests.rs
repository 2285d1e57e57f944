//! Xattr engine scenarios on the temp filesystem
//!
//! Skipped when the filesystem backing the temp dir rejects `user.*`
//! attributes.

use xfsbench::xattr::{
    list_pool, prepare_xattr_files, run_xattr_bench, supports_user_xattrs, WARMUP_CYCLES,
};

fn xattr_dir() -> Option<tempfile::TempDir> {
    let dir = tempfile::tempdir().unwrap();
    if supports_user_xattrs(dir.path()) {
        Some(dir)
    } else {
        eprintln!("skipping: no user xattr support on temp filesystem");
        None
    }
}

#[test]
fn test_iterations_clamped_to_pool_size() {
    let Some(root) = xattr_dir() else { return };
    let files_dir = prepare_xattr_files(root.path(), "xattr_files", 500).unwrap();
    assert_eq!(list_pool(&files_dir).unwrap().len(), 500);

    let results = run_xattr_bench(&files_dir, &[8], 20000, WARMUP_CYCLES).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].iterations, 500);
}

#[test]
fn test_round_robin_reuses_smaller_pool() {
    let Some(root) = xattr_dir() else { return };
    let files_dir = prepare_xattr_files(root.path(), "xattr_files", 3).unwrap();

    // Small values only: tmpfs accepts user.* but caps their size
    let results = run_xattr_bench(&files_dir, &[8, 128], 3, 5).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].attr_size, 8);
    assert_eq!(results[1].attr_size, 128);
    assert!(results.iter().all(|r| r.iterations == 3));
}

#[test]
fn test_pool_files_are_single_byte() {
    let root = tempfile::tempdir().unwrap();
    let files_dir = prepare_xattr_files(root.path(), "xattr_files", 10).unwrap();
    let files = list_pool(&files_dir).unwrap();
    assert_eq!(files.len(), 10);
    assert!(files
        .iter()
        .all(|f| std::fs::metadata(f).unwrap().len() == 1));
    assert!(files[9].ends_with("x_9.dat"));
}
