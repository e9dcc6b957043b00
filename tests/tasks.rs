use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use taskvault::auth::{AuthResponse, TokenService};
use taskvault::models::Task;
use taskvault::routes;
use taskvault::state::AppState;
use taskvault::store::MemoryStore;
use uuid::Uuid;

fn app_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(MemoryStore::new()),
        TokenService::new("task_test_secret", Duration::minutes(60)),
        4,
    ))
}

// Signs up and logs in, returning the bearer token.
async fn signup_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/signup")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "signup failed for {}", email);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "login failed for {}", email);
    let auth: AuthResponse = test::read_body_json(resp).await;
    auth.access_token
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::config)).await;
    let token = signup_and_login(&app, "a@x.com", "pw1").await;

    // Create
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "buy milk" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().expect("id in response").to_string();

    // List
    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id.to_string(), id);
    assert_eq!(tasks[0].title, "buy milk");
    assert!(!tasks[0].completed);
    assert_eq!(tasks[0].description, None);

    // Partial update
    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}", id))
        .insert_header(bearer(&token))
        .set_json(json!({ "completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(tasks[0].completed);
    assert_eq!(tasks[0].title, "buy milk");

    // Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(tasks.is_empty());
}

#[actix_rt::test]
async fn test_tasks_are_isolated_between_users() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::config)).await;
    let alice = signup_and_login(&app, "alice@x.com", "pw-alice").await;
    let bob = signup_and_login(&app, "bob@x.com", "pw-bob").await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&alice))
        .set_json(json!({ "title": "alice's secret", "description": "private" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&bob))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(tasks.is_empty(), "bob must not see alice's tasks");

    let missing_id = Uuid::new_v4().to_string();
    for target in [id.as_str(), missing_id.as_str(), "not-a-uuid"] {
        let uri = format!("/tasks/{}", target);

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&bob))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {}", target);

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(&bob))
            .set_json(json!({ "title": "hijacked" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "PUT {}", target);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Task not found or access denied");

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&bob))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "DELETE {}", target);
    }

    // Alice's task survived untouched.
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", id))
        .insert_header(bearer(&alice))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(task.title, "alice's secret");
    assert_eq!(task.owner_email, "alice@x.com");
}

#[actix_rt::test]
async fn test_update_validation() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::config)).await;
    let token = signup_and_login(&app, "a@x.com", "pw1").await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "buy milk", "description": "semi-skimmed" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/tasks/{}", created["id"].as_str().unwrap());

    let test_cases = vec![
        (json!({}), "no fields"),
        (json!({ "title": null, "description": null, "completed": null }), "all null"),
        (json!({ "title": "" }), "empty title"),
        (json!({ "title": "   " }), "blank title"),
    ];
    for (payload, description) in test_cases {
        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(&token))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            StatusCode::BAD_REQUEST,
            "Test case failed: {}",
            description
        );
    }

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "buy oat milk" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&token))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(task.title, "buy oat milk");
    assert_eq!(task.description.as_deref(), Some("semi-skimmed"));
    assert!(!task.completed);
}

#[actix_rt::test]
async fn test_create_validation() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::config)).await;
    let token = signup_and_login(&app, "a@x.com", "pw1").await;

    let test_cases = vec![
        (json!({}), "missing title"),
        (json!({ "title": "" }), "empty title"),
        (json!({ "title": "a".repeat(201) }), "title too long"),
        (json!({ "title": "ok", "description": "b".repeat(1001) }), "description too long"),
    ];
    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/tasks")
            .insert_header(bearer(&token))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            StatusCode::BAD_REQUEST,
            "Test case failed: {}",
            description
        );
    }

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "already done", "completed": true }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );
}

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let app = test::init_service(App::new().app_data(app_state()).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .set_json(json!({ "title": "Unauthorized Task" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
