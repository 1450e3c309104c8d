use super::*;
use std::fs;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write");
}

fn setup() -> (tempfile::TempDir, ResourceScanner, RegistryPersistence) {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        &tmp.path().join("root/skills/alpha.md"),
        "# alpha\n\ndescription: first\npriority: 60\n",
    );
    write(&tmp.path().join("root/commands/beta.md"), "# beta\n");

    let scanner = ResourceScanner::new(tmp.path().join("root"), None);
    let persistence =
        RegistryPersistence::new(tmp.path().join("registry"), Duration::from_secs(3600));
    (tmp, scanner, persistence)
}

#[test]
fn test_first_load_scans_and_persists() {
    let (tmp, scanner, persistence) = setup();

    assert_eq!(persistence.validate(), CacheStatus::NoCache);
    let (snapshot, warnings) = persistence.load_or_scan(&scanner).expect("load");

    assert_eq!(snapshot.resources.len(), 2);
    assert!(warnings.is_empty());
    assert_eq!(snapshot.file_fingerprints.len(), 2);
    assert!(tmp.path().join("registry").join(LAST_SCAN_FILE).is_file());
    assert!(tmp.path().join("registry").join(SNAPSHOT_FILE).is_file());
    assert_eq!(persistence.validate(), CacheStatus::Cached);
}

#[test]
fn test_second_load_hits_cache_with_same_resources() {
    let (_tmp, scanner, persistence) = setup();

    let (first, _) = persistence.load_or_scan(&scanner).expect("first");
    let (second, warnings) = persistence.load_or_scan(&scanner).expect("second");

    assert!(warnings.is_empty());
    assert_eq!(second.scanned_at, first.scanned_at, "cache hit expected");
    assert_eq!(second.resources, first.resources);
}

#[test]
fn test_single_byte_mutation_forces_rescan() {
    let (tmp, scanner, persistence) = setup();
    persistence.load_or_scan(&scanner).expect("first");

    // Mutate one descriptor byte.
    let descriptor = tmp.path().join("root/skills/alpha.md");
    let mut content = fs::read_to_string(&descriptor).expect("read");
    content.push('x');
    fs::write(&descriptor, content).expect("write");

    assert_eq!(persistence.validate(), CacheStatus::Invalid);
    let stats = persistence.get_stats();
    assert_eq!(stats.status, CacheStatus::Invalid);
    assert!(!stats.is_valid);

    let (snapshot, _) = persistence.load_or_scan(&scanner).expect("rescan");
    assert_eq!(snapshot.resources.len(), 2);
    assert_eq!(persistence.validate(), CacheStatus::Cached);
}

#[test]
fn test_missing_fingerprinted_file_invalidates() {
    let (tmp, scanner, persistence) = setup();
    persistence.load_or_scan(&scanner).expect("first");

    fs::remove_file(tmp.path().join("root/commands/beta.md")).expect("remove");
    assert_eq!(persistence.validate(), CacheStatus::Invalid);
}

#[test]
fn test_expired_ttl_invalidates() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(&tmp.path().join("root/skills/a.md"), "# a\n");

    let scanner = ResourceScanner::new(tmp.path().join("root"), None);
    let persistence =
        RegistryPersistence::new(tmp.path().join("registry"), Duration::from_secs(0));

    persistence.load_or_scan(&scanner).expect("scan");
    // TTL of zero: the cache is stale the moment it is written.
    assert_eq!(persistence.validate(), CacheStatus::Invalid);
}

#[test]
fn test_invalidate_then_load_equals_fresh_scan() {
    let (_tmp, scanner, persistence) = setup();
    let (first, _) = persistence.load_or_scan(&scanner).expect("first");

    persistence.invalidate().expect("invalidate");
    assert_eq!(persistence.validate(), CacheStatus::NoCache);

    let (second, _) = persistence.load_or_scan(&scanner).expect("second");
    assert_ne!(second.scanned_at, first.scanned_at);
    assert_eq!(second.resources, first.resources);
    assert_eq!(second.file_fingerprints, first.file_fingerprints);
}

#[test]
fn test_invalidate_on_empty_dir_is_ok() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let persistence =
        RegistryPersistence::new(tmp.path().join("registry"), Duration::from_secs(60));
    persistence.invalidate().expect("no-op invalidate");
}

#[test]
fn test_corrupt_index_reports_invalid() {
    let (tmp, scanner, persistence) = setup();
    persistence.load_or_scan(&scanner).expect("first");

    write(&tmp.path().join("registry").join(LAST_SCAN_FILE), "{not json");
    assert_eq!(persistence.validate(), CacheStatus::Invalid);

    // A corrupt cache triggers a rescan rather than an error.
    let (snapshot, _) = persistence.load_or_scan(&scanner).expect("rescan");
    assert_eq!(snapshot.resources.len(), 2);
}

#[test]
fn test_stats_surface() {
    let (_tmp, scanner, persistence) = setup();

    let before = persistence.get_stats();
    assert_eq!(before.status, CacheStatus::NoCache);
    assert!(before.age_seconds.is_none());
    assert!(before.total_resources.is_none());
    assert_eq!(before.ttl_seconds, 3600);

    persistence.load_or_scan(&scanner).expect("scan");

    let after = persistence.get_stats();
    assert_eq!(after.status, CacheStatus::Cached);
    assert!(after.is_valid);
    assert_eq!(after.total_resources, Some(2));
    assert!(after.age_seconds.is_some());
    assert!(after.scan_duration_ms.is_some());
}

#[test]
fn test_snapshot_count_by_kind() {
    let (_tmp, scanner, persistence) = setup();
    let (snapshot, _) = persistence.load_or_scan(&scanner).expect("scan");
    let counts = snapshot.resource_count_by_kind();
    assert_eq!(counts["skill"], 1);
    assert_eq!(counts["command"], 1);
}
