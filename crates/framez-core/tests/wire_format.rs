//! Wire-format checks: entity structs against the JSON the backend actually
//! sends and expects, plus schema validation of insert payloads.

use framez_core::auth_state::AuthState;
use framez_core::entities::{NewPost, Post, Profile};
use framez_core::events::{AuthEvent, AuthEventKind};
use pretty_assertions::assert_eq;
use schemars::schema_for;
use uuid::Uuid;

fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

#[test]
fn post_row_parses_from_rest_payload() {
    let row = serde_json::json!({
        "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
        "user_id": "0d1f2e3c-4b5a-6978-8a9b-0c1d2e3f4a5b",
        "content": "first light",
        "image_url": null,
        "created_at": "2025-11-09T10:15:00.123456+00:00"
    });

    let post: Post = serde_json::from_value(row).expect("post row should parse");
    assert_eq!(post.content, "first light");
    assert!(post.image_url.is_none());
}

#[test]
fn profile_row_tolerates_missing_optional_columns() {
    let row = serde_json::json!({
        "id": "0d1f2e3c-4b5a-6978-8a9b-0c1d2e3f4a5b",
        "username": "ada",
        "full_name": "Ada Lovelace"
    });

    let profile: Profile = serde_json::from_value(row).expect("profile row should parse");
    assert_eq!(profile.username, "ada");
    assert!(profile.bio.is_none());
    assert!(profile.avatar_url.is_none());
    assert!(profile.email.is_none());
}

#[test]
fn new_post_without_image_sends_explicit_null() {
    let payload = NewPost {
        user_id: Uuid::new_v4(),
        content: "no picture".into(),
        image_url: None,
    };

    let value = serde_json::to_value(&payload).expect("serialize");
    assert!(value.get("image_url").is_some_and(serde_json::Value::is_null));

    let schema = serde_json::to_value(schema_for!(NewPost)).expect("schema");
    let errors = validate_against_schema(&schema, &value);
    assert!(errors.is_empty(), "schema validation failed: {errors:?}");
}

#[test]
fn auth_state_is_tagged_by_state() {
    let value = serde_json::to_value(AuthState::Unauthenticated).expect("serialize");
    assert_eq!(value, serde_json::json!({ "state": "unauthenticated" }));
}

#[test]
fn auth_event_kind_uses_backend_names() {
    let event = AuthEvent::signed_out();
    let value = serde_json::to_value(&event).expect("serialize");
    assert_eq!(value["kind"], "SIGNED_OUT");
    assert_eq!(AuthEventKind::TokenRefreshed.to_string(), "TOKEN_REFRESHED");
}
