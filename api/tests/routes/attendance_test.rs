use crate::helpers::{bearer, json_body, make_test_app};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use db::{
    models::{student, subject, user},
    test_utils::{seed_student, seed_subject, seed_teacher},
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestData {
    owner: user::Model,
    other_teacher: user::Model,
    alice_user: user::Model,
    alice: student::Model,
    bob: student::Model,
    subject: subject::Model,
}

async fn setup_test_data(db: &sea_orm::DatabaseConnection) -> TestData {
    let (owner, t) = seed_teacher(db, "owner", "CSE").await;
    let (other_teacher, _) = seed_teacher(db, "other", "CSE").await;
    let (alice_user, alice) = seed_student(db, "REG001", "CSE", "5", "A").await;
    let (_, bob) = seed_student(db, "REG002", "CSE", "5", "A").await;
    let subject = seed_subject(db, Some(t.id), "CS501", "5", &["A"]).await;

    TestData {
        owner,
        other_teacher,
        alice_user,
        alice,
        bob,
        subject,
    }
}

fn request(method: &str, uri: &str, auth: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", auth);
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn batch_body(data: &TestData, session: i32) -> Value {
    json!({
        "semester": "5",
        "section": "A",
        "items": [
            { "student": data.alice.id, "subject": data.subject.id, "date": "2025-03-01", "session": session, "status": "Present" },
            { "student": data.bob.id, "subject": data.subject.id, "date": "2025-03-01", "session": session, "status": "Absent" }
        ]
    })
}

async fn create_session(app: &Router, data: &TestData, session: i32) -> String {
    let req = request(
        "POST",
        "/api/attendance",
        &bearer(&data.owner),
        Some(batch_body(data, session)),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["data"]["session_id"]
        .as_str()
        .unwrap()
        .to_owned()
}

#[tokio::test]
async fn create_batch_shares_one_session_id() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;

    let req = request("POST", "/api/attendance", &bearer(&data.owner), Some(batch_body(&data, 1)));
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["created_count"], 2);
    let session_id = json["data"]["session_id"].as_str().unwrap().to_owned();

    let req = request(
        "GET",
        &format!("/api/attendance/session/{session_id}"),
        &bearer(&data.owner),
        None,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let records = json["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    for r in records {
        assert_eq!(r["session_id"], session_id.as_str());
        assert_eq!(r["semester"], "5");
        assert_eq!(r["section"], "A");
        assert_eq!(r["recorded_by"], "owner");
    }
}

#[tokio::test]
async fn single_mark_body_is_accepted() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;

    let body = json!({
        "student": data.alice.id, "subject": data.subject.id, "status": "Present",
        "semester": "5", "section": "A"
    });
    let req = request("POST", "/api/attendance", &bearer(&data.owner), Some(body));
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["data"]["created_count"], 1);
}

#[tokio::test]
async fn marking_an_occupied_slot_is_a_conflict_and_writes_nothing() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;
    create_session(&app, &data, 1).await;

    let req = request("POST", "/api/attendance", &bearer(&data.owner), Some(batch_body(&data, 1)));
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "conflict");

    let req = request("GET", "/api/attendance", &bearer(&data.owner), None);
    let json = json_body(app.oneshot(req).await.unwrap()).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn students_cannot_record_attendance() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;

    let req = request(
        "POST",
        "/api/attendance",
        &bearer(&data.alice_user),
        Some(batch_body(&data, 1)),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["error"], "forbidden");
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;

    let req = request(
        "POST",
        "/api/attendance",
        &bearer(&data.owner),
        Some(json!({ "hello": "world" })),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "validation");
}

#[tokio::test]
async fn unparseable_json_uses_the_error_envelope() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/attendance")
        .header("Authorization", bearer(&data.owner))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "validation");
    assert!(json["data"].is_null());
    assert!(!json["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn non_numeric_record_id_uses_the_error_envelope() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;
    let auth = bearer(&data.owner);

    for (method, uri) in [
        ("DELETE", "/api/attendance/abc"),
        ("GET", "/api/attendance/abc"),
        ("GET", "/api/attendance/abc/summary"),
    ] {
        let response = app
            .clone()
            .oneshot(request(method, uri, &auth, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {uri}");

        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "validation");
    }
}

#[tokio::test]
async fn students_cannot_delete_sessions() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;
    let session_id = create_session(&app, &data, 1).await;

    let req = request(
        "DELETE",
        &format!("/api/attendance/session/{session_id}"),
        &bearer(&data.alice_user),
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["error"], "forbidden");

    let req = request(
        "GET",
        &format!("/api/attendance/session/{session_id}"),
        &bearer(&data.owner),
        None,
    );
    let json = json_body(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let req = request("GET", "/api/attendance/teacher-deleted", &bearer(&data.owner), None);
    let json = json_body(app.oneshot(req).await.unwrap()).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn delete_and_restore_session_round_trip() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;
    let session_id = create_session(&app, &data, 1).await;
    let auth = bearer(&data.owner);

    let req = request("DELETE", &format!("/api/attendance/session/{session_id}"), &auth, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["deleted_count"], 2);

    let req = request("GET", "/api/attendance/teacher-deleted", &auth, None);
    let json = json_body(app.clone().oneshot(req).await.unwrap()).await;
    let deleted = json["data"].as_array().unwrap();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0]["session_id"], session_id.as_str());
    assert_eq!(deleted[0]["total"], 2);

    let req = request(
        "POST",
        &format!("/api/attendance/session/{session_id}/restore"),
        &auth,
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["restored_count"], 2);

    let req = request("GET", "/api/attendance/teacher-summary", &auth, None);
    let json = json_body(app.oneshot(req).await.unwrap()).await;
    let summary = json["data"].as_array().unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0]["present"], 1);
    assert_eq!(summary[0]["absent"], 1);
}

#[tokio::test]
async fn restore_fails_when_a_slot_was_marked_again() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;
    let auth = bearer(&data.owner);
    let session_id = create_session(&app, &data, 1).await;

    let req = request("DELETE", &format!("/api/attendance/session/{session_id}"), &auth, None);
    assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::OK);

    create_session(&app, &data, 1).await;

    let req = request(
        "POST",
        &format!("/api/attendance/session/{session_id}/restore"),
        &auth,
        None,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "conflict");
}

#[tokio::test]
async fn malformed_session_id_is_a_validation_error() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;

    let req = request(
        "DELETE",
        "/api/attendance/session/not-a-uuid",
        &bearer(&data.owner),
        None,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "validation");
}

#[tokio::test]
async fn other_teacher_cannot_delete_a_record() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;
    let session_id = create_session(&app, &data, 1).await;

    let req = request(
        "GET",
        &format!("/api/attendance/session/{session_id}"),
        &bearer(&data.owner),
        None,
    );
    let json = json_body(app.clone().oneshot(req).await.unwrap()).await;
    let record_id = json["data"][0]["id"].as_i64().unwrap();

    let req = request(
        "DELETE",
        &format!("/api/attendance/{record_id}"),
        &bearer(&data.other_teacher),
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let req = request(
        "DELETE",
        &format!("/api/attendance/{record_id}"),
        &bearer(&data.owner),
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = request(
        "GET",
        &format!("/api/attendance/{record_id}"),
        &bearer(&data.owner),
        None,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn student_sees_only_own_records_and_summary() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;
    create_session(&app, &data, 1).await;
    create_session(&app, &data, 2).await;
    let auth = bearer(&data.alice_user);

    let req = request("GET", "/api/attendance", &auth, None);
    let json = json_body(app.clone().oneshot(req).await.unwrap()).await;
    let records = json["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["student"] == data.alice.id));

    let req = request("GET", &format!("/api/attendance/{}/summary", data.alice.id), &auth, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["present"], 2);
    assert_eq!(json["data"]["percentage"], 100.0);

    let req = request("GET", &format!("/api/attendance/{}/summary", data.bob.id), &auth, None);
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_returns_csv_attachment() {
    let (app, state) = make_test_app().await;
    let data = setup_test_data(state.db()).await;
    let session_id = create_session(&app, &data, 1).await;

    let req = request(
        "GET",
        &format!("/api/attendance/session/{session_id}/export"),
        &bearer(&data.owner),
        None,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    assert!(
        response.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .contains("attachment")
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("register_number,"));
    assert_eq!(lines.count(), 2);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let (app, _) = make_test_app().await;

    let req = Request::builder()
        .method("GET")
        .uri("/api/attendance")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "unauthorized");
}
