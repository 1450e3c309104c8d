use super::*;

fn touch(path: &Path) {
    std::fs::write(path, "log line\n").expect("write");
}

#[test]
fn test_prune_keeps_newest_rolled_files() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let log_dir = tmp.path().to_path_buf();

    for day in 1..=5 {
        touch(&log_dir.join(format!("{ORCHESTRATOR_LOG}.2026-07-0{day}")));
    }
    // An unrolled companion file must never be pruned.
    touch(&log_dir.join("unrelated.txt"));

    let manager = LogManager::new(log_dir.clone(), 2);
    let removed = manager.prune().expect("prune");

    assert_eq!(removed, 3);
    assert!(!log_dir.join(format!("{ORCHESTRATOR_LOG}.2026-07-01")).exists());
    assert!(!log_dir.join(format!("{ORCHESTRATOR_LOG}.2026-07-03")).exists());
    assert!(log_dir.join(format!("{ORCHESTRATOR_LOG}.2026-07-04")).exists());
    assert!(log_dir.join(format!("{ORCHESTRATOR_LOG}.2026-07-05")).exists());
    assert!(log_dir.join("unrelated.txt").exists());
}

#[test]
fn test_prune_under_budget_is_noop() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let log_dir = tmp.path().to_path_buf();
    touch(&log_dir.join(format!("{ERRORS_LOG}.2026-07-01")));

    let manager = LogManager::new(log_dir, 7);
    assert_eq!(manager.prune().expect("prune"), 0);
}

#[test]
fn test_prune_missing_dir_is_noop() {
    let manager = LogManager::new(PathBuf::from("/nonexistent/maestro-logs"), 7);
    assert_eq!(manager.prune().expect("prune"), 0);
}

#[test]
fn test_prune_handles_both_prefixes() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let log_dir = tmp.path().to_path_buf();

    for day in 1..=3 {
        touch(&log_dir.join(format!("{ORCHESTRATOR_LOG}.2026-07-0{day}")));
        touch(&log_dir.join(format!("{ERRORS_LOG}.2026-07-0{day}")));
    }

    let manager = LogManager::new(log_dir, 1);
    assert_eq!(manager.prune().expect("prune"), 4);
}
