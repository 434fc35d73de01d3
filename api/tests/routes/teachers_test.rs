use crate::helpers::{bearer, json_body, make_test_app};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use db::test_utils::{seed_student, seed_subject, seed_teacher};
use tower::ServiceExt;

fn get(uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", auth)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn profile_includes_owned_subjects() {
    let (app, state) = make_test_app().await;
    let (u, t) = seed_teacher(state.db(), "prof_t", "CSE").await;
    seed_subject(state.db(), Some(t.id), "CS400", "4", &["A"]).await;

    let response = app.oneshot(get("/api/teachers/profile", &bearer(&u))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["data"]["department"], "CSE");
    assert_eq!(json["data"]["user"]["username"], "prof_t");
    assert!(json["data"]["user"].get("password_hash").is_none());
    assert_eq!(json["data"]["subjects"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn profile_is_not_found_for_students() {
    let (app, state) = make_test_app().await;
    let (u, _) = seed_student(state.db(), "REG400", "CSE", "4", "A").await;

    let response = app.oneshot(get("/api/teachers/profile", &bearer(&u))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn roster_lists_students_of_the_section() {
    let (app, state) = make_test_app().await;
    let (u, t) = seed_teacher(state.db(), "roster_t", "CSE").await;
    let subject = seed_subject(state.db(), Some(t.id), "CS410", "4", &["A", "B"]).await;
    seed_student(state.db(), "REG411", "CSE", "4", "A").await;
    seed_student(state.db(), "REG410", "CSE", "4", "A").await;
    seed_student(state.db(), "REG412", "CSE", "4", "B").await;
    seed_student(state.db(), "REG413", "ECE", "4", "A").await;

    let uri = format!("/api/teachers/students?subject={}&semester=4&section=A", subject.id);
    let response = app.oneshot(get(&uri, &bearer(&u))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let regs: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["register_number"].as_str().unwrap())
        .collect();
    assert_eq!(regs, vec!["REG410", "REG411"]);
}

#[tokio::test]
async fn roster_for_undeclared_section_is_a_validation_error() {
    let (app, state) = make_test_app().await;
    let (u, t) = seed_teacher(state.db(), "roster_v", "CSE").await;
    let subject = seed_subject(state.db(), Some(t.id), "CS420", "4", &["A"]).await;
    let auth = bearer(&u);

    let uri = format!("/api/teachers/students?subject={}&semester=4&section=Z", subject.id);
    let response = app.clone().oneshot(get(&uri, &auth)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "validation");

    let uri = format!("/api/teachers/students?subject={}", subject.id);
    let response = app.oneshot(get(&uri, &auth)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
