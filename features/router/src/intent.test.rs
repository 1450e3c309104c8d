use super::*;

#[test]
fn test_candidates_win_over_entity() {
    // When both are non-empty and disagree, candidates are preferred.
    let intent = Intent {
        entity: Some("skill:preferred".to_string()),
        candidates: vec!["skill:first".to_string(), "skill:second".to_string()],
        ..Default::default()
    };
    assert_eq!(
        intent.candidate_list(),
        vec!["skill:first", "skill:second"]
    );
}

#[test]
fn test_entity_used_when_candidates_empty() {
    let intent = Intent {
        entity: Some("skill:only".to_string()),
        ..Default::default()
    };
    assert_eq!(intent.candidate_list(), vec!["skill:only"]);
}

#[test]
fn test_empty_intent_yields_no_candidates() {
    let intent = Intent::default();
    assert!(intent.candidate_list().is_empty());
    assert_eq!(intent.mode, IntentMode::Plain);
    assert_eq!(intent.complexity, Complexity::Medium);
}

#[test]
fn test_intent_deserializes_with_defaults() {
    let intent: Intent = serde_json::from_str(
        r#"{"mode":"skill","task_type":"review","confidence":0.8,"candidates":["skill:x"]}"#,
    )
    .expect("deserialize");
    assert_eq!(intent.mode, IntentMode::Skill);
    assert_eq!(intent.task_type, "review");
    assert!(intent.entity.is_none());
    assert_eq!(intent.candidate_list(), vec!["skill:x"]);
}
