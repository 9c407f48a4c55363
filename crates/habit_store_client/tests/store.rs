use habit_store_client::http_client::RestHabitStore;
use habit_store_client::{DayKey, HabitStore, Level, StoreError};
use secrecy::SecretString;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> RestHabitStore {
    RestHabitStore::new(&server.uri(), SecretString::new("tok".into()))
}

fn day(s: &str) -> DayKey {
    DayKey::parse(s).expect("valid day key")
}

#[tokio::test]
async fn fetch_logs_sends_api_key_and_parses_rows() {
    let server = MockServer::start().await;
    let body = serde_json::json!([
        {"habit_id": 1, "done_on": "2024-01-01", "level": "basic"},
        {"habit_id": 1, "done_on": "2024-01-02", "level": "advanced"},
        {"habit_id": 2, "done_on": "2024-01-02"}
    ]);
    Mock::given(method("GET"))
        .and(path("/rest/v1/habit_logs"))
        .and(query_param("user_id", "eq.u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let logs = store_for(&server).fetch_logs("u1").await.expect("logs");
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[1].level, Level::Advanced);
    // level missing on the wire decodes as basic
    assert_eq!(logs[2].level, Level::Basic);

    let received = server.received_requests().await.unwrap();
    assert!(!received.is_empty());
    let apikey = received[0].headers.get("apikey").cloned();
    assert!(apikey.is_some());
    let auth = received[0].headers.get("authorization").cloned().unwrap();
    assert!(auth.to_str().map(|s| s.starts_with("Bearer ")).unwrap_or(false));
}

#[tokio::test]
async fn fetch_habits_resolves_link_table_then_details() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_habits"))
        .and(query_param("user_id", "eq.u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"habit_id": 4},
            {"habit_id": 9}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/habits"))
        .and(query_param("id", "in.(4,9)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 4, "name": "Read", "category": "learning"},
            {"id": 9, "name": "Run", "category": "health"}
        ])))
        .mount(&server)
        .await;

    let habits = store_for(&server).fetch_habits("u1").await.expect("habits");
    assert_eq!(habits.len(), 2);
    assert_eq!(habits[0].name, "Read");
}

#[tokio::test]
async fn fetch_habits_with_empty_link_table_skips_detail_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_habits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let habits = store_for(&server).fetch_habits("u1").await.expect("habits");
    assert!(habits.is_empty());

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1, "no request should hit the habits table");
}

#[tokio::test]
async fn upsert_log_posts_row_with_conflict_resolution() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/habit_logs"))
        .and(query_param("on_conflict", "user_id,habit_id,done_on"))
        .and(header("Prefer", "resolution=merge-duplicates,return=minimal"))
        .and(body_json(serde_json::json!({
            "user_id": "u1",
            "habit_id": 4,
            "done_on": "2024-02-10",
            "level": "intermediate"
        })))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store
        .upsert_log("u1", 4, day("2024-02-10"), Level::Intermediate)
        .await
        .expect("upsert");

    // Idempotence: the identical call succeeds again against the same
    // conflict target instead of failing on the unique key.
    store
        .upsert_log("u1", 4, day("2024-02-10"), Level::Intermediate)
        .await
        .expect("second upsert");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
}

#[tokio::test]
async fn delete_log_filters_on_the_full_key() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/habit_logs"))
        .and(query_param("user_id", "eq.u1"))
        .and(query_param("habit_id", "eq.4"))
        .and(query_param("done_on", "eq.2024-02-10"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.delete_log("u1", 4, day("2024-02-10")).await.expect("delete");
    // Deleting the now-missing row still answers 204: not an error.
    store.delete_log("u1", 4, day("2024-02-10")).await.expect("second delete");
}

#[tokio::test]
async fn auth_failures_map_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/habit_logs"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let err = store_for(&server).fetch_logs("u1").await.unwrap_err();
    match err {
        StoreError::Auth(msg) => assert!(msg.contains("bad key")),
        other => panic!("expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_row_maps_to_invalid_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/habit_logs"))
        .respond_with(ResponseTemplate::new(422).set_body_string("level check failed"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .upsert_log("u1", 4, day("2024-02-10"), Level::Basic)
        .await
        .unwrap_err();
    match err {
        StoreError::InvalidInput(msg) => assert!(msg.contains("level check")),
        other => panic!("expected InvalidInput error, got {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_status_surfaces_code_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/habit_logs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db on fire"))
        .mount(&server)
        .await;

    let err = store_for(&server).fetch_logs("u1").await.unwrap_err();
    let rendered = format!("{err}");
    assert!(rendered.contains("500"));
    assert!(rendered.contains("db on fire"));
}

#[tokio::test]
async fn base_url_trailing_slash_is_handled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/habit_logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let base = format!("{}/", server.uri());
    let store = RestHabitStore::new(&base, SecretString::new("tok".into()));
    let logs = store.fetch_logs("u1").await.expect("logs");
    assert!(logs.is_empty());
}
