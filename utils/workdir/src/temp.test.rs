use super::*;

#[test]
fn test_scoped_dir_created_under_base() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let manager = TempFileManager::new(tmp.path().join("temp"), Duration::from_secs(60));

    let dir = manager.scoped_dir("skill:commit").expect("scoped dir");
    assert!(dir.is_dir());
    assert!(dir.starts_with(manager.base_dir()));
    assert!(dir.ends_with("skill-commit"));

    // Idempotent.
    let again = manager.scoped_dir("skill:commit").expect("scoped dir");
    assert_eq!(dir, again);
}

#[test]
fn test_cleanup_removes_namespace_dir() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let manager = TempFileManager::new(tmp.path().join("temp"), Duration::from_secs(60));

    let dir = manager.scoped_dir("agent:review").expect("scoped dir");
    std::fs::write(dir.join("scratch.txt"), "x").expect("write");

    manager.cleanup("agent:review").expect("cleanup");
    assert!(!dir.exists());

    // Cleaning a missing namespace is fine.
    manager.cleanup("agent:review").expect("repeat cleanup");
}

#[test]
fn test_cleanup_expired_respects_ttl() {
    let tmp = tempfile::tempdir().expect("tempdir");

    // TTL of zero: everything is immediately expired.
    let expired = TempFileManager::new(tmp.path().join("temp"), Duration::from_secs(0));
    expired.scoped_dir("a").expect("dir a");
    expired.scoped_dir("b").expect("dir b");
    assert_eq!(expired.cleanup_expired().expect("cleanup"), 2);

    // Long TTL: nothing is expired.
    let fresh = TempFileManager::new(tmp.path().join("temp"), Duration::from_secs(3600));
    fresh.scoped_dir("c").expect("dir c");
    assert_eq!(fresh.cleanup_expired().expect("cleanup"), 0);
    assert!(tmp.path().join("temp/c").is_dir());
}

#[test]
fn test_cleanup_expired_on_missing_root() {
    let manager = TempFileManager::new(
        PathBuf::from("/nonexistent/maestro-temp"),
        Duration::from_secs(0),
    );
    assert_eq!(manager.cleanup_expired().expect("cleanup"), 0);
}

#[test]
fn test_sanitize_namespace() {
    assert_eq!(sanitize("skill:commit"), "skill-commit");
    assert_eq!(sanitize("plain"), "plain");
    assert_eq!(sanitize("a/b\\c"), "a-b-c");
}
