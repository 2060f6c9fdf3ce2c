//! Integration tests for client task requests and worker applications.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, delete_auth, get_auth, post_json_auth, put_json_auth};
use efference_db::repositories::{TaskAssignmentRepo, TaskRepo};
use sqlx::PgPool;

async fn open_request(pool: &PgPool, client_token: &str, title: &str) -> String {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "title": title, "description": "Need kitchen footage" });
    let response = post_json_auth(app, "/api/v1/task-requests", body, client_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "open");
    json["data"]["id"].as_str().unwrap().to_string()
}

async fn apply(pool: &PgPool, request_id: &str, worker_token: &str) -> String {
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/task-requests/{request_id}/applications");
    let body = serde_json::json!({ "message": "I have a camera rig" });
    let response = post_json_auth(app, &uri, body, worker_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn workers_cannot_create_requests(pool: PgPool) {
    let (_, token) = create_user(&pool, "worker", "worker").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "title": "Nope" });
    let response = post_json_auth(app, "/api/v1/task-requests", body, &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn clients_only_see_their_own_requests(pool: PgPool) {
    let (_, c1_token) = create_user(&pool, "c1", "client").await;
    let (_, c2_token) = create_user(&pool, "c2", "client").await;
    let (_, admin_token) = create_user(&pool, "admin", "admin").await;
    let mine = open_request(&pool, &c1_token, "Mine").await;
    let theirs = open_request(&pool, &c2_token, "Theirs").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/task-requests", &c1_token).await;
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], mine.as_str());

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/task-requests/{theirs}");
    assert_eq!(get_auth(app, &uri, &c1_token).await.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/task-requests?status=open", &admin_token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/task-requests?status=bogus", &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn client_can_only_close_an_open_request(pool: PgPool) {
    let (_, token) = create_user(&pool, "client", "client").await;
    let id = open_request(&pool, &token, "Garden").await;
    let uri = format!("/api/v1/task-requests/{id}");

    let app = common::build_test_app(pool.clone());
    let response =
        put_json_auth(app, &uri, serde_json::json!({ "status": "fulfilled" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, serde_json::json!({ "status": "closed" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "closed");

    // Closed requests are frozen.
    let app = common::build_test_app(pool);
    let response = put_json_auth(app, &uri, serde_json::json!({ "title": "Later" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn closing_a_request_rejects_pending_applications(pool: PgPool) {
    let (_, client_token) = create_user(&pool, "client", "client").await;
    let (_, admin_token) = create_user(&pool, "admin", "admin").await;
    let (_, worker_token) = create_user(&pool, "worker", "worker").await;
    let request_id = open_request(&pool, &client_token, "Dishes").await;
    let application = apply(&pool, &request_id, &worker_token).await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/task-requests/{request_id}");
    let body = serde_json::json!({ "status": "closed" });
    let response = put_json_auth(app, &uri, body, &client_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/task-applications/{application}/approve");
    let response = post_json_auth(app, &uri, serde_json::json!({}), &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/task-requests/{request_id}");
    let json = body_json(get_auth(app, &uri, &client_token).await).await;
    assert_eq!(json["data"]["status"], "closed");
    assert!(json["data"]["task_id"].is_null());

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/task-requests/{request_id}/applications");
    let json = body_json(get_auth(app, &uri, &client_token).await).await;
    assert_eq!(json["data"][0]["status"], "rejected");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_application_is_rejected(pool: PgPool) {
    let (_, client_token) = create_user(&pool, "client", "client").await;
    let (_, worker_token) = create_user(&pool, "worker", "worker").await;
    let id = open_request(&pool, &client_token, "Laundry").await;
    apply(&pool, &id, &worker_token).await;

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/task-requests/{id}/applications");
    let response = post_json_auth(app, &uri, serde_json::json!({}), &worker_token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn clients_cannot_apply(pool: PgPool) {
    let (_, client_token) = create_user(&pool, "client", "client").await;
    let id = open_request(&pool, &client_token, "Self service").await;
    let app = common::build_test_app(pool);

    let uri = format!("/api/v1/task-requests/{id}/applications");
    let response = post_json_auth(app, &uri, serde_json::json!({}), &client_token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approval_creates_task_and_assignment(pool: PgPool) {
    let (_, client_token) = create_user(&pool, "client", "client").await;
    let (_, admin_token) = create_user(&pool, "admin", "admin").await;
    let (w1, w1_token) = create_user(&pool, "w1", "worker").await;
    let (_, w2_token) = create_user(&pool, "w2", "trainer").await;
    let request_id = open_request(&pool, &client_token, "Vacuum").await;
    let winner = apply(&pool, &request_id, &w1_token).await;
    let loser = apply(&pool, &request_id, &w2_token).await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/task-applications/{winner}/approve");
    let response = post_json_auth(app, &uri, serde_json::json!({}), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["application"]["status"], "approved");
    assert_eq!(json["data"]["request"]["status"], "fulfilled");

    let task_id: uuid::Uuid = json["data"]["task_id"].as_str().unwrap().parse().unwrap();
    let task = TaskRepo::find_by_id(&pool, task_id).await.unwrap().unwrap();
    assert_eq!(task.title, "Vacuum");
    assert!(TaskAssignmentRepo::exists(&pool, task_id, w1.id).await.unwrap());

    // The competing application was rejected with it.
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/task-requests/{request_id}/applications");
    let response = get_auth(app, &uri, &client_token).await;
    let json = body_json(response).await;
    let other = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"] == loser.as_str())
        .unwrap()
        .clone();
    assert_eq!(other["status"], "rejected");

    // A decided application cannot be decided again.
    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/task-applications/{loser}/approve");
    let response = post_json_auth(app, &uri, serde_json::json!({}), &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reject_and_withdraw(pool: PgPool) {
    let (_, client_token) = create_user(&pool, "client", "client").await;
    let (_, admin_token) = create_user(&pool, "admin", "admin").await;
    let (_, w1_token) = create_user(&pool, "w1", "worker").await;
    let (_, w2_token) = create_user(&pool, "w2", "worker").await;
    let request_id = open_request(&pool, &client_token, "Windows").await;
    let rejected = apply(&pool, &request_id, &w1_token).await;
    let pending = apply(&pool, &request_id, &w2_token).await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/task-applications/{rejected}/reject");
    let response = post_json_auth(app, &uri, serde_json::json!({}), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "rejected");

    // Withdrawing after a decision is refused.
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/task-applications/{rejected}");
    assert_eq!(delete_auth(app, &uri, &w1_token).await.status(), StatusCode::BAD_REQUEST);

    // Someone else's application cannot be withdrawn.
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/task-applications/{pending}");
    assert_eq!(delete_auth(app, &uri, &w1_token).await.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    assert_eq!(delete_auth(app, &uri, &w2_token).await.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/task-applications", &w2_token).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn applications_listing_is_scoped(pool: PgPool) {
    let (_, client_token) = create_user(&pool, "client", "client").await;
    let (_, admin_token) = create_user(&pool, "admin", "admin").await;
    let (_, w1_token) = create_user(&pool, "w1", "worker").await;
    let (_, w2_token) = create_user(&pool, "w2", "worker").await;
    let request_id = open_request(&pool, &client_token, "Dust").await;
    apply(&pool, &request_id, &w1_token).await;
    apply(&pool, &request_id, &w2_token).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/task-applications", &w1_token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/task-applications?status=pending", &admin_token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/task-applications", &client_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
