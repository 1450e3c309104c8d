use super::*;
use std::fs;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write");
}

#[test]
fn test_flat_file_layout() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        &tmp.path().join("skills/commit.md"),
        "# commit\n\ndescription: Commit helper\n",
    );

    let scanner = ResourceScanner::new(tmp.path().to_path_buf(), None);
    let outcome = scanner.scan();

    assert_eq!(outcome.resources.len(), 1);
    assert!(outcome.warnings.is_empty());
    let resource = &outcome.resources[0];
    assert_eq!(resource.namespace(), "skill:commit");
    assert_eq!(resource.scope, ResourceScope::User);
    assert!(resource.category.is_none());
    assert_eq!(outcome.fingerprints.len(), 1);
}

#[test]
fn test_categorised_layout_title_cases_category() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        &tmp.path().join("commands/code-review/check-style.md"),
        "# check-style\n\ndescription: Style checker\n",
    );

    let scanner = ResourceScanner::new(tmp.path().to_path_buf(), None);
    let outcome = scanner.scan();

    assert_eq!(outcome.resources.len(), 1);
    let resource = &outcome.resources[0];
    assert_eq!(resource.namespace(), "command:check-style");
    assert_eq!(resource.category.as_deref(), Some("Code Review"));
}

#[test]
fn test_directory_based_layout_collects_assets() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let skill_dir = tmp.path().join("skills/doc-gen");
    write(&skill_dir.join("SKILL.md"), "# doc-gen\n");
    write(&skill_dir.join("template.html"), "<html/>");
    write(&skill_dir.join("data/table.csv"), "a,b");

    let scanner = ResourceScanner::new(tmp.path().to_path_buf(), None);
    let outcome = scanner.scan();

    assert_eq!(outcome.resources.len(), 1);
    let resource = &outcome.resources[0];
    assert_eq!(resource.name, "doc-gen");
    assert_eq!(resource.assets.len(), 2);
    assert!(
        resource
            .assets
            .iter()
            .any(|asset| asset.ends_with("template.html"))
    );
    assert!(
        resource
            .assets
            .iter()
            .any(|asset| asset.ends_with("data/table.csv"))
    );
}

#[test]
fn test_missing_name_warns_and_skips() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        &tmp.path().join("skills/anonymous.md"),
        "description: no name here\n",
    );

    let scanner = ResourceScanner::new(tmp.path().to_path_buf(), None);
    let outcome = scanner.scan();

    assert!(outcome.resources.is_empty());
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].message.contains("name"));
    // The file is still fingerprinted: editing it must invalidate caches.
    assert_eq!(outcome.fingerprints.len(), 1);
}

#[test]
fn test_malformed_descriptor_does_not_abort_scan() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(&tmp.path().join("skills/broken.md"), "---\nname: broken\n");
    write(&tmp.path().join("skills/good.md"), "# good\n");

    let scanner = ResourceScanner::new(tmp.path().to_path_buf(), None);
    let outcome = scanner.scan();

    assert_eq!(outcome.resources.len(), 1);
    assert_eq!(outcome.resources[0].name, "good");
    assert_eq!(outcome.warnings.len(), 1);
}

#[test]
fn test_project_scope_shadows_user_scope_regardless_of_priority() {
    let user = tempfile::tempdir().expect("tempdir");
    let project = tempfile::tempdir().expect("tempdir");

    // User scope descriptor carries the *higher* priority.
    write(
        &user.path().join("skills/x.md"),
        "# x\n\npriority: 90\ndescription: user copy\n",
    );
    write(
        &project.path().join("skills/x.md"),
        "# x\n\npriority: 70\ndescription: project copy\n",
    );

    let scanner = ResourceScanner::new(
        user.path().to_path_buf(),
        Some(project.path().to_path_buf()),
    );
    let outcome = scanner.scan();

    assert_eq!(outcome.resources.len(), 1);
    let resource = &outcome.resources[0];
    assert_eq!(resource.scope, ResourceScope::Project);
    assert_eq!(resource.priority, 70);
    assert_eq!(resource.description.as_deref(), Some("project copy"));
}

#[test]
fn test_same_scope_duplicate_keeps_higher_priority() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(&tmp.path().join("skills/a/dup.md"), "# dup\n\npriority: 10\n");
    write(&tmp.path().join("skills/b/dup.md"), "# dup\n\npriority: 60\n");

    let scanner = ResourceScanner::new(tmp.path().to_path_buf(), None);
    let outcome = scanner.scan();

    assert_eq!(outcome.resources.len(), 1);
    assert_eq!(outcome.resources[0].priority, 60);
}

#[test]
fn test_same_scope_priority_tie_keeps_first_source() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(
        &tmp.path().join("skills/a/dup.md"),
        "# dup\n\ndescription: first\n",
    );
    write(
        &tmp.path().join("skills/b/dup.md"),
        "# dup\n\ndescription: second\n",
    );

    let scanner = ResourceScanner::new(tmp.path().to_path_buf(), None);
    let outcome = scanner.scan();

    assert_eq!(outcome.resources.len(), 1);
    assert_eq!(outcome.resources[0].description.as_deref(), Some("first"));
}

#[test]
fn test_every_kind_directory_is_scanned() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(&tmp.path().join("skills/s.md"), "# s\n");
    write(&tmp.path().join("commands/c.md"), "# c\n");
    write(&tmp.path().join("agents/a.md"), "# a\n");
    write(&tmp.path().join("prompts/p.md"), "# p\n");

    let scanner = ResourceScanner::new(tmp.path().to_path_buf(), None);
    let outcome = scanner.scan();

    let namespaces: Vec<String> = outcome
        .resources
        .iter()
        .map(Resource::namespace)
        .collect();
    assert_eq!(
        namespaces,
        vec!["skill:s", "command:c", "agent:a", "prompt:p"]
    );
}

#[test]
fn test_missing_root_yields_empty_outcome() {
    let scanner = ResourceScanner::new(PathBuf::from("/nonexistent/maestro-root"), None);
    let outcome = scanner.scan();
    assert!(outcome.resources.is_empty());
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_non_markdown_files_ignored() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(&tmp.path().join("skills/readme.txt"), "not a descriptor");
    write(&tmp.path().join("skills/real.md"), "# real\n");

    let scanner = ResourceScanner::new(tmp.path().to_path_buf(), None);
    let outcome = scanner.scan();
    assert_eq!(outcome.resources.len(), 1);
}

#[test]
fn test_title_case() {
    assert_eq!(title_case("code-review"), "Code Review");
    assert_eq!(title_case("docs"), "Docs");
    assert_eq!(title_case("a_b-c"), "A B C");
}
