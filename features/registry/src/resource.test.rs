use super::*;

fn resource(kind: ResourceKind, name: &str) -> Resource {
    Resource {
        name: name.to_string(),
        kind,
        source: PathBuf::from("/tmp/x.md"),
        scope: ResourceScope::User,
        priority: 50,
        enabled: true,
        description: None,
        backend: None,
        tags: Vec::new(),
        dependencies: Vec::new(),
        version: None,
        category: None,
        assets: Vec::new(),
        extra: BTreeMap::new(),
        sections: Vec::new(),
    }
}

#[test]
fn test_namespace_format() {
    assert_eq!(resource(ResourceKind::Skill, "commit").namespace(), "skill:commit");
    assert_eq!(resource(ResourceKind::Agent, "review").namespace(), "agent:review");
}

#[test]
fn test_kind_directory_and_descriptor_names() {
    assert_eq!(ResourceKind::Skill.dir_name(), "skills");
    assert_eq!(ResourceKind::Prompt.dir_name(), "prompts");
    assert_eq!(ResourceKind::Command.descriptor_file(), "COMMAND.md");
    assert_eq!(ResourceKind::all().len(), 4);
}

#[test]
fn test_section_lookup() {
    let mut r = resource(ResourceKind::Skill, "x");
    r.sections = vec![
        Section {
            heading: "System Prompt".to_string(),
            body: "be helpful".to_string(),
        },
        Section {
            heading: "Notes".to_string(),
            body: "none".to_string(),
        },
    ];
    assert_eq!(r.section("System Prompt"), Some("be helpful"));
    assert_eq!(r.section("Missing"), None);
}

#[test]
fn test_scope_ordering_project_over_user() {
    assert!(ResourceScope::Project > ResourceScope::User);
}

#[test]
fn test_config_value_accessors() {
    assert_eq!(ConfigValue::Bool(true).as_bool(), Some(true));
    assert_eq!(ConfigValue::Int(7).as_int(), Some(7));
    assert_eq!(ConfigValue::Text("x".to_string()).as_text(), Some("x"));
    let list = ConfigValue::List(vec!["a".to_string(), "b".to_string()]);
    assert_eq!(list.as_list().map(<[String]>::len), Some(2));
    assert_eq!(list.to_string(), "[a, b]");
}

#[test]
fn test_resource_serde_round_trip() {
    let mut r = resource(ResourceKind::Command, "deploy");
    r.tags = vec!["ops".to_string()];
    r.extra
        .insert("owner".to_string(), ConfigValue::Text("infra".to_string()));

    let json = serde_json::to_string(&r).expect("serialize");
    assert!(json.contains("\"type\":\"command\""));
    let back: Resource = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, r);
}
