use super::*;
use pretty_assertions::assert_eq;

const BASIC: &str = r#"# test-skill

description: A testing helper
enabled: true
priority: 80
backend: claude
tags: [test, demo]

## System Prompt

You are a testing assistant.

## User Prompt Template

Handle the following request:
{{request}}
"#;

#[test]
fn test_h1_form_basic() {
    let parsed = parse_descriptor("test.md", BASIC).expect("parse");

    assert_eq!(parsed.name.as_deref(), Some("test-skill"));
    assert_eq!(parsed.description.as_deref(), Some("A testing helper"));
    assert!(parsed.enabled);
    assert_eq!(parsed.priority, 80);
    assert_eq!(parsed.backend.as_deref(), Some("claude"));
    assert_eq!(parsed.tags, vec!["test", "demo"]);

    assert_eq!(parsed.sections.len(), 2);
    assert_eq!(parsed.sections[0].heading, "System Prompt");
    assert!(parsed.sections[0].body.contains("testing assistant"));
    assert_eq!(parsed.sections[1].heading, "User Prompt Template");
    assert!(parsed.sections[1].body.contains("{{request}}"));
}

#[test]
fn test_front_matter_form() {
    let content = r#"---
name: frontmatter-skill
description: Uses YAML front matter
enabled: false
priority: 90
dependencies:
  - skill:other
---

# Heading (not the name)

## System Prompt

From the front matter form.
"#;
    let parsed = parse_descriptor("fm.md", content).expect("parse");

    assert_eq!(parsed.name.as_deref(), Some("frontmatter-skill"));
    assert_eq!(parsed.description.as_deref(), Some("Uses YAML front matter"));
    assert!(!parsed.enabled);
    assert_eq!(parsed.priority, 90);
    assert_eq!(parsed.dependencies, vec!["skill:other"]);
    assert_eq!(parsed.sections.len(), 1);
}

#[test]
fn test_front_matter_name_falls_back_to_h1() {
    let content = "---\npriority: 10\n---\n\n# from-the-body\n\n## S\n\nbody\n";
    let parsed = parse_descriptor("x.md", content).expect("parse");
    assert_eq!(parsed.name.as_deref(), Some("from-the-body"));
    assert_eq!(parsed.priority, 10);
}

#[test]
fn test_front_matter_missing_close_is_error() {
    let content = "---\nname: broken\n";
    assert!(parse_descriptor("x.md", content).is_err());
}

#[test]
fn test_value_types() {
    let content = "# type-test\n\nbool_true: true\nbool_false: false\nint_value: 123\nlist_value: [item1, item2, item3]\nstring_value: hello world\n\n## Content\n\nTest content\n";
    let parsed = parse_descriptor("types.md", content).expect("parse");

    assert_eq!(parsed.extra["bool_true"], ConfigValue::Bool(true));
    assert_eq!(parsed.extra["bool_false"], ConfigValue::Bool(false));
    assert_eq!(parsed.extra["int_value"], ConfigValue::Int(123));
    assert_eq!(
        parsed.extra["list_value"],
        ConfigValue::List(vec![
            "item1".to_string(),
            "item2".to_string(),
            "item3".to_string()
        ])
    );
    assert_eq!(
        parsed.extra["string_value"],
        ConfigValue::Text("hello world".to_string())
    );
}

#[test]
fn test_multiple_sections_order_preserved() {
    let content =
        "# multi\n\n## Section 1\n\nfirst\n\n## Section 2\n\nsecond\n\n## Section 3\n\nthird\n";
    let parsed = parse_descriptor("multi.md", content).expect("parse");

    let headings: Vec<&str> = parsed
        .sections
        .iter()
        .map(|section| section.heading.as_str())
        .collect();
    assert_eq!(headings, vec!["Section 1", "Section 2", "Section 3"]);
    assert_eq!(parsed.sections[2].body, "third");
}

#[test]
fn test_metadata_stops_at_first_section() {
    let content = "# x\n\npriority: 70\n\n## Body\n\nnot_metadata: 1\n";
    let parsed = parse_descriptor("x.md", content).expect("parse");
    assert_eq!(parsed.priority, 70);
    assert!(!parsed.extra.contains_key("not_metadata"));
    assert!(parsed.sections[0].body.contains("not_metadata: 1"));
}

#[test]
fn test_defaults() {
    let parsed = parse_descriptor("d.md", "# bare\n").expect("parse");
    assert!(parsed.enabled);
    assert_eq!(parsed.priority, DEFAULT_PRIORITY);
    assert!(parsed.tags.is_empty());
    assert!(parsed.sections.is_empty());
}

#[test]
fn test_canonical_round_trip() {
    let parsed = parse_descriptor("basic.md", BASIC).expect("parse");
    let emitted = parsed.canonical_markdown();
    let reparsed = parse_descriptor("emitted.md", &emitted).expect("reparse");
    assert_eq!(reparsed, parsed);
}

#[test]
fn test_canonical_round_trip_front_matter() {
    let content = "---\nname: fm\ndescription: d\nenabled: false\npriority: 5\ntags: [a, b]\ncustom: 42\n---\n\n## S\n\nbody text\n";
    let parsed = parse_descriptor("fm.md", content).expect("parse");
    let reparsed =
        parse_descriptor("emitted.md", &parsed.canonical_markdown()).expect("reparse");
    assert_eq!(reparsed, parsed);
}

#[test]
fn test_bom_is_stripped() {
    let content = "\u{feff}# bom-skill\n";
    let parsed = parse_descriptor("bom.md", content).expect("parse");
    assert_eq!(parsed.name.as_deref(), Some("bom-skill"));
}
