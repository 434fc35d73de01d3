use crate::helpers::{bearer, json_body, make_test_app};
use axum::{
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use db::{
    models::user,
    test_utils::{seed_student, seed_teacher},
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn post_json(uri: &str, body: Value, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header("Authorization", auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn login_returns_token_and_teacher_role() {
    let (app, state) = make_test_app().await;
    seed_teacher(state.db(), "t_login", "CSE").await;

    let req = post_json(
        "/api/auth/login",
        json!({ "username": "t_login", "password": "password123" }),
        None,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["role"], "teacher");
    assert_eq!(json["data"]["must_change_password"], false);
    assert!(json["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (app, state) = make_test_app().await;
    seed_teacher(state.db(), "t_wrong", "CSE").await;

    let req = post_json(
        "/api/auth/login",
        json!({ "username": "t_wrong", "password": "nope" }),
        None,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn login_with_empty_fields_is_a_validation_error() {
    let (app, _) = make_test_app().await;

    let req = post_json("/api/auth/login", json!({ "username": "", "password": "" }), None);
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "validation");
}

#[tokio::test]
async fn imported_student_must_change_default_password() {
    let (app, state) = make_test_app().await;
    user::Model::create(state.db(), "REG900", None, None, "REG900", false)
        .await
        .unwrap();

    let req = post_json(
        "/api/auth/login",
        json!({ "username": "REG900", "password": "REG900" }),
        None,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["data"]["must_change_password"], true);
    assert_eq!(json["data"]["role"], "unknown");
}

#[tokio::test]
async fn change_password_then_login_with_new_password() {
    let (app, state) = make_test_app().await;
    let (u, _) = seed_student(state.db(), "REG901", "CSE", "5", "A").await;
    let auth = bearer(&u);

    let req = post_json(
        "/api/auth/change-password",
        json!({ "old_password": "password123", "new_password": "brand-new-pass" }),
        Some(&auth),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = post_json(
        "/api/auth/login",
        json!({ "username": "REG901", "password": "brand-new-pass" }),
        None,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn change_password_rejects_short_or_missing_passwords() {
    let (app, state) = make_test_app().await;
    let (u, _) = seed_student(state.db(), "REG902", "CSE", "5", "A").await;
    let auth = bearer(&u);

    let req = post_json(
        "/api/auth/change-password",
        json!({ "old_password": "password123", "new_password": "short" }),
        Some(&auth),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let req = post_json(
        "/api/auth/change-password",
        json!({ "new_password": "long-enough-pass" }),
        Some(&auth),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "Both passwords are required");
}

#[tokio::test]
async fn change_password_requires_a_token() {
    let (app, _) = make_test_app().await;

    let req = post_json(
        "/api/auth/change-password",
        json!({ "old_password": "a", "new_password": "bbbbbbbbbb" }),
        None,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
