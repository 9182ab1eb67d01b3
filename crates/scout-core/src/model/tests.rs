use crate::model::*;

#[test]
fn test_query_char_len_counts_characters() {
    let q = Query::new("né");
    assert_eq!(q.char_len(), 2);
    assert_eq!(q.as_str().len(), 3);
}

#[test]
fn test_query_normalized_is_lowercase() {
    let q = Query::new("Design REVIEW");
    assert_eq!(q.normalized(), "design review");
    // The original text is kept as typed
    assert_eq!(q.as_str(), "Design REVIEW");
}

#[test]
fn test_match_keys_per_variant() {
    assert_eq!(Task::new(1, "Write docs").match_key(), "Write docs");
    assert_eq!(Project::new(2, "Apollo").match_key(), "Apollo");
    assert_eq!(User::new(3, "alice").match_key(), "alice");

    let entity: CandidateEntity = User::new(3, "alice").into();
    assert_eq!(entity.kind(), EntityKind::User);
    assert_eq!(entity.match_key(), "alice");
}

#[test]
fn test_task_deserialize_api_payload() {
    let json = r#"{
        "id": 7,
        "title": "Fix login bug",
        "description": "Users cannot log in",
        "status": "Work In Progress",
        "priority": "Urgent",
        "tags": "auth, backend",
        "startDate": "2024-01-05T00:00:00.000Z",
        "dueDate": "2024-01-12T00:00:00.000Z",
        "points": 5,
        "projectId": 2,
        "authorUserId": 1,
        "assignedUserId": 3
    }"#;
    let task: Task = serde_json::from_str(json).unwrap();
    assert_eq!(task.id, 7);
    assert_eq!(task.status, Some(TaskStatus::WorkInProgress));
    assert_eq!(task.priority, Some(Priority::Urgent));
    assert_eq!(task.tag_list(), vec!["auth", "backend"]);
    assert_eq!(task.points, Some(5));
    assert!(task.start_date.unwrap() < task.due_date.unwrap());
}

#[test]
fn test_unknown_status_does_not_fail_decode() {
    let json = r#"{"id": 1, "title": "t", "status": "Blocked", "priority": "Someday"}"#;
    let task: Task = serde_json::from_str(json).unwrap();
    assert_eq!(task.status, Some(TaskStatus::Unknown));
    assert_eq!(task.priority, Some(Priority::Unknown));
}

#[test]
fn test_user_deserialize_camel_case() {
    let json = r#"{"userId": 4, "username": "bob", "profilePictureUrl": "p4.jpeg", "teamId": 1}"#;
    let user: User = serde_json::from_str(json).unwrap();
    assert_eq!(user.user_id, 4);
    assert_eq!(user.profile_picture_url.as_deref(), Some("p4.jpeg"));
    assert_eq!(user.team_id, Some(1));
}

#[test]
fn test_search_response_missing_variants_are_empty() {
    let json = r#"{"tasks": [{"id": 1, "title": "Alpha"}], "users": null}"#;
    let response: SearchResponse = serde_json::from_str(json).unwrap();
    let candidates = response.into_candidates();
    assert_eq!(candidates.tasks.len(), 1);
    assert!(candidates.projects.is_empty());
    assert!(candidates.users.is_empty());
    assert_eq!(candidates.len(), 1);
}

#[test]
fn test_search_response_empty_object() {
    let response: SearchResponse = serde_json::from_str("{}").unwrap();
    assert!(response.into_candidates().is_empty());
}

#[test]
fn test_candidate_set_into_entities_order() {
    let set = CandidateSet {
        tasks: vec![Task::new(1, "a")],
        projects: vec![Project::new(2, "b")],
        users: vec![User::new(3, "c")],
    };
    let kinds: Vec<EntityKind> = set.into_entities().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![EntityKind::Task, EntityKind::Project, EntityKind::User]
    );
}

#[test]
fn test_entity_kind_display_and_title() {
    assert_eq!(EntityKind::Project.to_string(), "project");
    assert_eq!(EntityKind::User.section_title(), "Users");
}

#[test]
fn test_query_serializes_as_plain_string() {
    let q = Query::new("Apollo");
    assert_eq!(serde_json::to_string(&q).unwrap(), r#""Apollo""#);

    let back: Query = serde_json::from_str(r#""Apollo""#).unwrap();
    assert_eq!(back, q);
}

#[test]
fn test_aggregated_result_json_carries_query_text() {
    let result = AggregatedResult {
        query: Query::new("apollo"),
        generation: 3,
        tasks: vec![],
        projects: vec![],
        users: vec![],
    };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["query"], "apollo");
    assert_eq!(json["generation"], 3);
}
