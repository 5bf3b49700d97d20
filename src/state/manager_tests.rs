//! Tests for StateManager and the incremental cursor

use super::*;
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};
use test_case::test_case;

fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

// ============================================================================
// Loading Tests
// ============================================================================

#[tokio::test]
async fn test_state_manager_in_memory_is_empty() {
    let manager = StateManager::in_memory();
    assert!(manager.get_bookmark("calls", None).await.is_none());
    assert_eq!(manager.to_value().await.unwrap(), json!({"bookmarks": {}}));
}

#[tokio::test]
async fn test_from_json_bare_state() {
    let manager = StateManager::from_json(
        r#"{"bookmarks": {"calls": {"replication_key": "started_at", "replication_key_value": "2024-01-02T00:00:00Z"}}}"#,
    )
    .unwrap();

    assert_eq!(
        manager.get_bookmark("calls", None).await,
        Some(json!("2024-01-02T00:00:00Z"))
    );
}

#[tokio::test]
async fn test_from_json_unwraps_value_envelope() {
    let manager = StateManager::from_json(
        r#"{"value": {"bookmarks": {"users": {"replication_key": "created_at", "replication_key_value": "2023-06-01T00:00:00Z"}}}}"#,
    )
    .unwrap();

    assert_eq!(
        manager.get_bookmark("users", None).await,
        Some(json!("2023-06-01T00:00:00Z"))
    );
}

#[test_case("" ; "blank")]
#[test_case("{}" ; "empty object")]
#[test_case(r#"{"value": null}"# ; "null envelope")]
#[tokio::test]
async fn test_from_json_empty_inputs(json: &str) {
    let manager = StateManager::from_json(json).unwrap();
    assert!(manager.snapshot().await.bookmarks.is_empty());
}

#[test_case("not json" ; "invalid json")]
#[test_case(r#"{"bookmarks": []}"# ; "wrong shape")]
fn test_from_json_rejects_bad_state(json: &str) {
    let err = StateManager::from_json(json).unwrap_err();
    assert!(matches!(err, crate::error::Error::State { .. }), "{err:?}");
}

#[tokio::test]
async fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"bookmarks": {{"numbers": {{"replication_key": "created_at", "replication_key_value": "2022-05-05T12:00:00Z"}}}}}}"#
    )
    .unwrap();

    let manager = StateManager::from_file(file.path()).unwrap();
    assert_eq!(
        manager.get_bookmark("numbers", None).await,
        Some(json!("2022-05-05T12:00:00Z"))
    );
}

#[tokio::test]
async fn test_from_missing_file_starts_fresh() {
    let dir = tempdir().unwrap();
    let manager = StateManager::from_file(dir.path().join("state.json")).unwrap();
    assert_eq!(manager.snapshot().await, State::new());
}

// ============================================================================
// Bookmark Tests
// ============================================================================

#[tokio::test]
async fn test_commit_bookmark_never_regresses() {
    let manager = StateManager::in_memory();

    assert!(
        manager
            .commit_bookmark("calls", None, "started_at", json!("2024-01-05T00:00:00Z"))
            .await
    );
    assert!(
        !manager
            .commit_bookmark("calls", None, "started_at", json!("2024-01-04T00:00:00Z"))
            .await
    );

    assert_eq!(
        manager.to_value().await.unwrap(),
        json!({"bookmarks": {"calls": {
            "replication_key": "started_at",
            "replication_key_value": "2024-01-05T00:00:00Z"
        }}})
    );
}

#[tokio::test]
async fn test_clones_share_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();

    clone
        .commit_bookmark("contacts", None, "created_at", json!("2024-02-01T00:00:00Z"))
        .await;
    assert_eq!(
        manager.get_bookmark("contacts", None).await,
        Some(json!("2024-02-01T00:00:00Z"))
    );
}

#[tokio::test]
async fn test_partitioned_bookmarks() {
    let manager = StateManager::in_memory();
    let context = crate::types::ContextMap::from([("user_id".to_string(), json!(42))]);

    manager
        .commit_bookmark("user", Some(&context), "created_at", json!("2024-01-01T00:00:00Z"))
        .await;

    assert!(manager.get_bookmark("user", None).await.is_none());
    assert_eq!(
        manager.get_bookmark("user", Some(&context)).await,
        Some(json!("2024-01-01T00:00:00Z"))
    );
}

// ============================================================================
// Cursor Tests
// ============================================================================

#[test]
fn test_from_param_prefers_bookmark() {
    let bookmark = json!("2024-03-01T00:00:00Z");
    let (from, point) = compute_from_param(
        Some(&bookmark),
        Some(utc("2024-01-01T00:00:00Z")),
        Utc::now(),
    )
    .unwrap();

    assert_eq!(from, 1709251200);
    assert_eq!(point, StartingPoint::Bookmark);
}

#[test]
fn test_from_param_uses_start_date_without_bookmark() {
    let (from, point) =
        compute_from_param(None, Some(utc("2024-01-01T00:00:00Z")), Utc::now()).unwrap();
    assert_eq!(from, 1704067200);
    assert_eq!(point, StartingPoint::StartDate);
}

#[test]
fn test_from_param_falls_back_to_wall_clock() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let (from, point) = compute_from_param(None, None, now).unwrap();
    assert_eq!(from, now.timestamp());
    assert_eq!(point, StartingPoint::WallClock);
    assert_eq!(point.to_string(), "wall clock");
}

#[test]
fn test_from_param_accepts_epoch_bookmark() {
    let (from, _) = compute_from_param(Some(&json!(1704067200)), None, Utc::now()).unwrap();
    assert_eq!(from, 1704067200);
}

#[test]
fn test_from_param_rejects_unreadable_bookmark() {
    let err = compute_from_param(Some(&json!("yesterday")), None, Utc::now()).unwrap_err();
    assert!(matches!(err, crate::error::Error::State { .. }));
}

#[test]
fn test_incremental_params_first_request() {
    let params = IncrementalParams::new(
        None,
        Some(utc("2024-01-01T00:00:00Z")),
        None,
        true,
        Utc::now(),
    )
    .unwrap();

    assert_eq!(
        params.to_query(),
        vec![("from", "1704067200".to_string()), ("order", "asc".to_string())]
    );
    assert_eq!(params.starting_point, StartingPoint::StartDate);
}

#[test]
fn test_incremental_params_with_end_date_and_no_replication_key() {
    let params = IncrementalParams::new(
        None,
        Some(utc("2024-01-01T00:00:00Z")),
        Some(utc("2024-02-01T00:00:00Z")),
        false,
        Utc::now(),
    )
    .unwrap();

    assert_eq!(
        params.to_query(),
        vec![
            ("from", "1704067200".to_string()),
            ("to", "1706745600".to_string()),
        ]
    );
}
