use crate::helpers::{bearer, json_body, make_test_app, roster_xlsx};
use axum::{
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use db::{
    models::{student, user},
    test_utils::{seed_student, seed_subject, seed_teacher},
};
use tower::ServiceExt;

const BOUNDARY: &str = "----roster-boundary";

fn upload_file(
    auth: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    content: &[u8],
) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/students/upload")
        .header("Authorization", auth)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn upload(auth: &str, field: &str, content: &str) -> Request<Body> {
    upload_file(auth, field, "roster.csv", "text/csv", content.as_bytes())
}

#[tokio::test]
async fn teacher_uploads_roster() {
    let (app, state) = make_test_app().await;
    let (u, _) = seed_teacher(state.db(), "uploader", "CSE").await;
    seed_student(state.db(), "REG500", "CSE", "5", "A").await;

    let csv = "register_number,full_name,department,semester,year,section\n\
               REG500,Existing,CSE,5,3,A\n\
               REG501,New Student,CSE,5,3,A\n";
    let response = app.oneshot(upload(&bearer(&u), "file", csv)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["data"]["processed"], 2);
    assert_eq!(json["data"]["created_users"], 1);
    assert_eq!(json["data"]["created_students"], 1);

    let created = student::Model::find_by_register_number(state.db(), "REG501")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.full_name, "New Student");
    let login = user::Model::find_by_username(state.db(), "REG501")
        .await
        .unwrap()
        .unwrap();
    assert!(login.verify_password("REG501"));
}

#[tokio::test]
async fn teacher_uploads_excel_roster() {
    let (app, state) = make_test_app().await;
    let (u, _) = seed_teacher(state.db(), "xlsx_uploader", "CSE").await;

    let workbook = roster_xlsx(&[
        &["Register_Number", "Full_Name", "Department", "Semester", "Year", "Section"],
        &["2021001", "Asha Rao", "CSE", "5", "3", "A"],
        &["2021002", "Ben Paul", "CSE", "5", "3", "B"],
    ]);
    let req = upload_file(
        &bearer(&u),
        "file",
        "students.xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        &workbook,
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["data"]["processed"], 2);
    assert_eq!(json["data"]["created_users"], 2);
    assert_eq!(json["data"]["created_students"], 2);

    let asha = student::Model::find_by_register_number(state.db(), "2021001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(asha.full_name, "Asha Rao");
    assert_eq!(asha.semester, "5");
    assert_eq!(asha.section, "A");
    let login = user::Model::find_by_username(state.db(), "2021002")
        .await
        .unwrap()
        .unwrap();
    assert!(login.verify_password("2021002"));
}

#[tokio::test]
async fn non_utf8_non_workbook_upload_is_rejected() {
    let (app, state) = make_test_app().await;
    let (u, _) = seed_teacher(state.db(), "binary_uploader", "CSE").await;

    let req = upload_file(
        &bearer(&u),
        "file",
        "roster.bin",
        "application/octet-stream",
        &[0xff, 0xfe, 0x00, 0x41],
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "validation");
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let (app, state) = make_test_app().await;
    let (u, _) = seed_teacher(state.db(), "uploader2", "CSE").await;

    let response = app
        .oneshot(upload(&bearer(&u), "attachment", "register_number\nX\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "No file uploaded");
}

#[tokio::test]
async fn upload_with_missing_column_is_rejected() {
    let (app, state) = make_test_app().await;
    let (u, _) = seed_teacher(state.db(), "uploader3", "CSE").await;

    let csv = "register_number,full_name\nREG510,Someone\n";
    let response = app.oneshot(upload(&bearer(&u), "file", csv)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "validation");
}

#[tokio::test]
async fn students_cannot_upload_rosters() {
    let (app, state) = make_test_app().await;
    let (u, _) = seed_student(state.db(), "REG520", "CSE", "5", "A").await;

    let csv = "register_number,full_name,department,semester,year,section\nREG521,X,CSE,5,3,A\n";
    let response = app.oneshot(upload(&bearer(&u), "file", csv)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn student_profile_reports_subjects_and_percentage() {
    let (app, state) = make_test_app().await;
    let (_, t) = seed_teacher(state.db(), "prof_owner", "CSE").await;
    let (u, s) = seed_student(state.db(), "REG530", "CSE", "5", "A").await;
    let subject = seed_subject(state.db(), Some(t.id), "CS530", "5", &["A"]).await;
    s.enroll(state.db(), subject.id).await.unwrap();

    let req = Request::builder()
        .method("GET")
        .uri("/api/students/profile")
        .header("Authorization", bearer(&u))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["data"]["register_number"], "REG530");
    assert_eq!(json["data"]["subjects"][0]["code"], "CS530");
    assert_eq!(json["data"]["total"], 0);
    assert_eq!(json["data"]["attendance_percentage"], 0.0);
}
