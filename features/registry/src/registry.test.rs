use super::*;
use crate::resource::ResourceScope;
use crate::resource::Section;
use std::path::PathBuf;

fn resource(kind: ResourceKind, name: &str, priority: i32, enabled: bool) -> Resource {
    Resource {
        name: name.to_string(),
        kind,
        source: PathBuf::from(format!("/tmp/{name}.md")),
        scope: ResourceScope::User,
        priority,
        enabled,
        description: None,
        backend: None,
        tags: Vec::new(),
        dependencies: Vec::new(),
        version: None,
        category: None,
        assets: Vec::new(),
        extra: Default::default(),
        sections: Vec::new(),
    }
}

#[test]
fn test_get_returns_enabled_only() {
    let mut registry = UnifiedRegistry::new();
    registry.register(resource(ResourceKind::Skill, "on", 50, true));
    registry.register(resource(ResourceKind::Skill, "off", 50, false));

    assert!(registry.get("skill:on").is_some());
    assert!(registry.get("skill:off").is_none());
    // The disabled record still exists.
    assert!(registry.get_any("skill:off").is_some());
}

#[test]
fn test_register_drops_lower_priority_duplicate() {
    let mut registry = UnifiedRegistry::new();
    assert!(registry.register(resource(ResourceKind::Skill, "x", 80, true)));
    assert!(!registry.register(resource(ResourceKind::Skill, "x", 50, true)));
    assert_eq!(
        registry.get("skill:x").map(|r| r.priority),
        Some(80)
    );

    // Higher priority replaces the whole record.
    assert!(registry.register(resource(ResourceKind::Skill, "x", 90, true)));
    assert_eq!(
        registry.get("skill:x").map(|r| r.priority),
        Some(90)
    );
}

#[test]
fn test_register_equal_priority_keeps_existing() {
    let mut registry = UnifiedRegistry::new();
    let mut first = resource(ResourceKind::Skill, "x", 50, true);
    first.description = Some("first".to_string());
    registry.register(first);
    registry.register(resource(ResourceKind::Skill, "x", 50, true));

    assert_eq!(
        registry
            .get("skill:x")
            .and_then(|r| r.description.as_deref()),
        Some("first")
    );
}

#[test]
fn test_list_by_kind_sorted_and_enabled_only() {
    let mut registry = UnifiedRegistry::new();
    registry.register(resource(ResourceKind::Skill, "b", 50, true));
    registry.register(resource(ResourceKind::Skill, "a", 50, true));
    registry.register(resource(ResourceKind::Skill, "c", 50, false));
    registry.register(resource(ResourceKind::Command, "d", 50, true));

    let names: Vec<&str> = registry
        .list_by_kind(ResourceKind::Skill)
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_list_by_tag() {
    let mut registry = UnifiedRegistry::new();
    let mut tagged = resource(ResourceKind::Skill, "t", 50, true);
    tagged.tags = vec!["docs".to_string()];
    registry.register(tagged);
    registry.register(resource(ResourceKind::Skill, "u", 50, true));

    assert_eq!(registry.list_by_tag("docs").len(), 1);
    assert!(registry.list_by_tag("missing").is_empty());
}

#[test]
fn test_stats_counts_disabled() {
    let mut registry = UnifiedRegistry::new();
    registry.register(resource(ResourceKind::Skill, "on", 50, true));
    registry.register(resource(ResourceKind::Skill, "off", 50, false));
    registry.register(resource(ResourceKind::Prompt, "p", 50, true));

    let stats = registry.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.enabled, 2);
    assert_eq!(stats.disabled, 1);
    assert_eq!(stats.by_kind["skill"], 2);
    assert_eq!(stats.by_kind["prompt"], 1);
}

#[test]
fn test_clear_and_hydrate() {
    let mut registry = UnifiedRegistry::hydrate(vec![
        resource(ResourceKind::Skill, "a", 50, true),
        resource(ResourceKind::Skill, "b", 50, true),
    ]);
    assert_eq!(registry.len(), 2);
    assert!(!registry.is_empty());

    registry.clear();
    assert!(registry.is_empty());
    assert!(registry.get("skill:a").is_none());
}

#[test]
fn test_all_includes_disabled_sorted() {
    let mut registry = UnifiedRegistry::new();
    registry.register(resource(ResourceKind::Skill, "z", 50, false));
    registry.register(resource(ResourceKind::Agent, "a", 50, true));

    let namespaces: Vec<String> = registry.all().iter().map(|r| r.namespace()).collect();
    assert_eq!(namespaces, vec!["agent:a", "skill:z"]);
}

#[test]
fn test_section_survives_registration() {
    let mut r = resource(ResourceKind::Skill, "s", 50, true);
    r.sections.push(Section {
        heading: "System Prompt".to_string(),
        body: "x".to_string(),
    });
    let mut registry = UnifiedRegistry::new();
    registry.register(r);
    assert_eq!(
        registry.get("skill:s").and_then(|r| r.section("System Prompt")),
        Some("x")
    );
}
