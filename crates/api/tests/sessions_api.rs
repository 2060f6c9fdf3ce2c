//! Integration tests for `/api/v1/sessions`, clips and processing jobs.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, delete_auth, get_auth, post_json_auth, put_json_auth};
use efference_core::types::DbId;
use efference_db::models::status::VideoSessionStatus;
use efference_db::models::task::{CreateTask, UpdateTask};
use efference_db::repositories::{TaskRepo, VideoSessionRepo};
use sqlx::PgPool;

async fn seed_task(pool: &PgPool, admin_id: DbId) -> DbId {
    let input = CreateTask {
        title: "Make the bed".to_string(),
        description: None,
    };
    TaskRepo::create(pool, admin_id, &input).await.unwrap().id
}

async fn create_session(pool: &PgPool, token: &str, task_id: DbId) -> String {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "task_id": task_id });
    let response = post_json_auth(app, "/api/v1/sessions", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn new_session_starts_uploading_and_belongs_to_caller(pool: PgPool) {
    let (admin, _) = create_user(&pool, "admin", "admin").await;
    let (trainer, token) = create_user(&pool, "trainer", "trainer").await;
    let task_id = seed_task(&pool, admin.id).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "task_id": task_id });
    let response = post_json_auth(app, "/api/v1/sessions", body, &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "uploading");
    assert_eq!(json["data"]["creator_id"], trainer.id.to_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn session_for_missing_task_is_404(pool: PgPool) {
    let (_, token) = create_user(&pool, "trainer", "trainer").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "task_id": uuid::Uuid::new_v4() });
    let response = post_json_auth(app, "/api/v1/sessions", body, &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn upload_session_defaults_to_oldest_active_task(pool: PgPool) {
    let (admin, _) = create_user(&pool, "admin", "admin").await;
    let (trainer, token) = create_user(&pool, "trainer", "trainer").await;
    let retired = seed_task(&pool, admin.id).await;
    let oldest_active = seed_task(&pool, admin.id).await;
    seed_task(&pool, admin.id).await;
    let update = UpdateTask {
        is_active: Some(false),
        ..UpdateTask::default()
    };
    TaskRepo::update(&pool, retired, &update).await.unwrap();

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "video_name": "kitchen.mp4",
        "file_size": 1024,
        "content_type": "video/mp4",
    });
    let response = post_json_auth(app, "/api/v1/sessions/upload", body, &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["task_id"], oldest_active.to_string());
    assert_eq!(json["data"]["creator_id"], trainer.id.to_string());
    assert_eq!(json["data"]["status"], "uploading");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn upload_session_uses_given_task_and_ignores_creator_override(pool: PgPool) {
    let (admin, _) = create_user(&pool, "admin", "admin").await;
    let (worker, token) = create_user(&pool, "worker", "worker").await;
    seed_task(&pool, admin.id).await;
    let chosen = seed_task(&pool, admin.id).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "task_id": chosen, "creator_id": admin.id });
    let response = post_json_auth(app, "/api/v1/sessions/upload", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["task_id"], chosen.to_string());
    assert_eq!(json["data"]["creator_id"], worker.id.to_string());

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "task_id": uuid::Uuid::new_v4() });
    let response = post_json_auth(app, "/api/v1/sessions/upload", body, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn upload_session_without_any_task_is_400(pool: PgPool) {
    let (_, token) = create_user(&pool, "trainer", "trainer").await;
    let app = common::build_test_app(pool.clone());

    let response =
        post_json_auth(app, "/api/v1/sessions/upload", serde_json::json!({}), &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No tasks available. Please create a task first.");
    let sessions = VideoSessionRepo::list(&pool, &Default::default(), 100, 0)
        .await
        .unwrap();
    assert!(sessions.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn upload_session_requires_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::post_json(app, "/api/v1/sessions/upload", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_admins_record_for_someone_else(pool: PgPool) {
    let (admin, admin_token) = create_user(&pool, "admin", "admin").await;
    let (trainer, trainer_token) = create_user(&pool, "trainer", "trainer").await;
    let (other, _) = create_user(&pool, "other", "worker").await;
    let task_id = seed_task(&pool, admin.id).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "task_id": task_id, "creator_id": other.id });
    let response = post_json_auth(app, "/api/v1/sessions", body, &trainer_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "task_id": task_id, "creator_id": trainer.id });
    let response = post_json_auth(app, "/api/v1/sessions", body, &admin_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["creator_id"], trainer.id.to_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn performers_only_see_their_own_sessions(pool: PgPool) {
    let (admin, admin_token) = create_user(&pool, "admin", "admin").await;
    let (_, t1_token) = create_user(&pool, "t1", "trainer").await;
    let (_, t2_token) = create_user(&pool, "t2", "trainer").await;
    let (_, reviewer_token) = create_user(&pool, "rev", "reviewer").await;
    let task_id = seed_task(&pool, admin.id).await;
    let mine = create_session(&pool, &t1_token, task_id).await;
    let theirs = create_session(&pool, &t2_token, task_id).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/sessions", &t1_token).await;
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], mine.as_str());

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/sessions/{theirs}");
    assert_eq!(get_auth(app, &uri, &t1_token).await.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    assert_eq!(get_auth(app, &uri, &reviewer_token).await.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/sessions", &admin_token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn status_filter_accepts_a_list(pool: PgPool) {
    let (admin, admin_token) = create_user(&pool, "admin", "admin").await;
    let (_, token) = create_user(&pool, "trainer", "trainer").await;
    let task_id = seed_task(&pool, admin.id).await;
    create_session(&pool, &token, task_id).await;
    let processing: DbId = create_session(&pool, &token, task_id).await.parse().unwrap();
    let reviewed: DbId = create_session(&pool, &token, task_id).await.parse().unwrap();

    VideoSessionRepo::transition(
        &pool,
        processing,
        VideoSessionStatus::Uploading,
        VideoSessionStatus::Processing,
    )
    .await
    .unwrap();
    for (from, to) in [
        (VideoSessionStatus::Uploading, VideoSessionStatus::Processing),
        (VideoSessionStatus::Processing, VideoSessionStatus::PendingReview),
    ] {
        VideoSessionRepo::transition(&pool, reviewed, from, to).await.unwrap();
    }

    let app = common::build_test_app(pool.clone());
    let response =
        get_auth(app, "/api/v1/sessions?status=PROCESSING,pending_review", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/sessions?status=lost", &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn session_details_include_clips(pool: PgPool) {
    let (admin, _) = create_user(&pool, "admin", "admin").await;
    let (_, token) = create_user(&pool, "trainer", "trainer").await;
    let task_id = seed_task(&pool, admin.id).await;
    let session_id = create_session(&pool, &token, task_id).await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/sessions/{session_id}/clips");
    let body = serde_json::json!({
        "session_id": session_id,
        "s3_key": format!("sessions/{session_id}/clip_1.mp4"),
        "part_number": 1,
        "filesize_bytes": 1024,
    });
    let response = post_json_auth(app, &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/sessions/{session_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], session_id.as_str());
    assert_eq!(json["data"]["raw_clips"].as_array().unwrap().len(), 1);
    assert!(json["data"]["processing_jobs"].as_array().unwrap().is_empty());
    assert!(json["data"]["review"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn clip_body_must_match_path_and_part_number_is_positive(pool: PgPool) {
    let (admin, _) = create_user(&pool, "admin", "admin").await;
    let (_, token) = create_user(&pool, "trainer", "trainer").await;
    let task_id = seed_task(&pool, admin.id).await;
    let session_id = create_session(&pool, &token, task_id).await;
    let uri = format!("/api/v1/sessions/{session_id}/clips");

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "session_id": uuid::Uuid::new_v4(),
        "s3_key": "sessions/x/clip_1.mp4",
        "part_number": 1,
    });
    let response = post_json_auth(app, &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "session_id": session_id,
        "s3_key": "sessions/x/clip_0.mp4",
        "part_number": 0,
    });
    let response = post_json_auth(app, &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_clip_part_conflicts_and_leaves_session_alone(pool: PgPool) {
    let (admin, _) = create_user(&pool, "admin", "admin").await;
    let (_, token) = create_user(&pool, "trainer", "trainer").await;
    let task_id = seed_task(&pool, admin.id).await;
    let session_id = create_session(&pool, &token, task_id).await;
    let uri = format!("/api/v1/sessions/{session_id}/clips");
    let body = serde_json::json!({
        "session_id": session_id,
        "s3_key": format!("sessions/{session_id}/clip_1.mp4"),
        "part_number": 1,
    });

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/sessions/{session_id}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "uploading");
    assert_eq!(json["data"]["raw_clips"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_reviewers_update_and_only_admins_delete(pool: PgPool) {
    let (admin, admin_token) = create_user(&pool, "admin", "admin").await;
    let (_, trainer_token) = create_user(&pool, "trainer", "trainer").await;
    let (reviewer, reviewer_token) = create_user(&pool, "rev", "reviewer").await;
    let task_id = seed_task(&pool, admin.id).await;
    let session_id = create_session(&pool, &trainer_token, task_id).await;
    let uri = format!("/api/v1/sessions/{session_id}");
    let body = serde_json::json!({ "reviewer_id": reviewer.id });

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, body.clone(), &trainer_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, &uri, body, &reviewer_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["reviewer_id"], reviewer.id.to_string());

    let app = common::build_test_app(pool.clone());
    assert_eq!(delete_auth(app, &uri, &reviewer_token).await.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    assert_eq!(delete_auth(app, &uri, &admin_token).await.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn successful_job_moves_session_to_review(pool: PgPool) {
    let (admin, admin_token) = create_user(&pool, "admin", "admin").await;
    let (_, token) = create_user(&pool, "trainer", "trainer").await;
    let task_id = seed_task(&pool, admin.id).await;
    let session_id = create_session(&pool, &token, task_id).await;
    let id: DbId = session_id.parse().unwrap();
    VideoSessionRepo::transition(
        &pool,
        id,
        VideoSessionStatus::Uploading,
        VideoSessionStatus::Processing,
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/sessions/{session_id}/processing-jobs");
    let body = serde_json::json!({
        "session_id": session_id,
        "step_function_execution_arn": "arn:aws:states:us-east-1:123:execution:pipeline:run-1",
    });
    let response = post_json_auth(app, &uri, body, &admin_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "running");
    let job_id = json["data"]["id"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/sessions/processing-jobs/{job_id}");
    let response =
        put_json_auth(app, &uri, serde_json::json!({ "status": "succeeded" }), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = VideoSessionRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(session.status, "pending_review");

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/sessions/{session_id}/processing-jobs");
    let response = get_auth(app, &uri, &token).await;
    assert_eq!(body_json(response).await["data"][0]["status"], "succeeded");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_job_fails_the_session(pool: PgPool) {
    let (admin, admin_token) = create_user(&pool, "admin", "admin").await;
    let (_, token) = create_user(&pool, "worker", "worker").await;
    let task_id = seed_task(&pool, admin.id).await;
    let session_id = create_session(&pool, &token, task_id).await;

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/sessions/{session_id}/processing-jobs");
    let body = serde_json::json!({
        "session_id": session_id,
        "step_function_execution_arn": "arn:aws:states:us-east-1:123:execution:pipeline:run-2",
    });
    let response = post_json_auth(app, &uri, body, &admin_token).await;
    let job_id = body_json(response).await["data"]["id"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/sessions/processing-jobs/{job_id}");
    let response =
        put_json_auth(app, &uri, serde_json::json!({ "status": "failed" }), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = VideoSessionRepo::find_by_id(&pool, session_id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, "failed");
}
