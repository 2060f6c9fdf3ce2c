mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with_config, cloudfront_config, get, post_json,
    test_config, FakeBucket,
};
use serde_json::json;

fn sample_bucket() -> Arc<FakeBucket> {
    Arc::new(FakeBucket::with_keys(&[
        ("vlm/datasets/kitchen/manifests/train.jsonl", 120),
        ("vlm/datasets/kitchen/shards/rgb/000000.tar", 4_000),
        ("vlm/datasets/kitchen/shards/rgb/000001.tar", 4_100),
        ("vlm/datasets/kitchen/shards/depth/000000.tar", 900),
        ("vlm/datasets/kitchen/shards/stray.tar", 10),
        ("vlm/datasets/kitchen/meta/stats.json", 30),
        ("vlm/datasets/kitchen/README.md", 5),
        ("vlm/datasets/garage/manifests/val.jsonl", 50),
        ("other/prefix/ignored.txt", 1),
    ]))
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_identifies_service() {
    let response = get(build_test_app(sample_bucket()), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "running");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["service"].is_string());
}

#[tokio::test]
async fn health_reports_bucket() {
    let json = body_json(get(build_test_app(sample_bucket()), "/health").await).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["bucket"], "test-datasets");
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lists_child_directories_as_datasets() {
    let bucket = sample_bucket();
    let response = get(build_test_app(bucket.clone()), "/datasets").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let datasets = json.as_array().unwrap();
    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0]["name"], "kitchen");
    assert_eq!(datasets[0]["path"], "vlm/datasets/kitchen");
    assert_eq!(datasets[1]["name"], "garage");
    assert_eq!(bucket.calls(), vec!["list vlm/datasets/"]);
}

#[tokio::test]
async fn flat_prefix_is_a_single_dataset() {
    let bucket = Arc::new(FakeBucket::with_keys(&[
        ("vlm/datasets/train.jsonl", 10),
        ("vlm/datasets/val.jsonl", 10),
    ]));
    let json = body_json(get(build_test_app(bucket), "/datasets").await).await;

    assert_eq!(json, json!([{ "name": "datasets", "path": "vlm/datasets" }]));
}

#[tokio::test]
async fn empty_prefix_lists_nothing() {
    let bucket = Arc::new(FakeBucket::default());
    let json = body_json(get(build_test_app(bucket), "/datasets").await).await;
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn storage_failure_is_sanitized() {
    let response = get(build_test_app(Arc::new(FakeBucket::failing())), "/datasets").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dataset_structure_groups_files() {
    let response = get(build_test_app(sample_bucket()), "/datasets/kitchen").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["name"], "kitchen");

    let manifests = json["manifests"].as_array().unwrap();
    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0]["key"], "vlm/datasets/kitchen/manifests/train.jsonl");
    assert_eq!(manifests[0]["relative_path"], "manifests/train.jsonl");
    assert_eq!(manifests[0]["size"], 120);

    let shards = json["shards"].as_array().unwrap();
    let types: Vec<&str> = shards.iter().map(|s| s["shard_type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["rgb", "rgb", "depth"]);
    assert_eq!(shards[2]["relative_path"], "shards/depth/000000.tar");

    assert_eq!(json["meta"].as_array().unwrap().len(), 1);
    assert_eq!(json["total_size"], 120 + 4_000 + 4_100 + 900 + 10 + 30 + 5);
}

#[tokio::test]
async fn unknown_dataset_is_404() {
    let response = get(build_test_app(sample_bucket()), "/datasets/attic").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn dataset_name_cannot_escape_root() {
    let bucket = sample_bucket();
    let response = get(build_test_app(bucket.clone()), "/datasets/..kitchen").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(bucket.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Downloads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn presigned_url_for_relative_path() {
    let bucket = sample_bucket();
    let response = post_json(
        build_test_app(bucket.clone()),
        "/downloads/presigned-url",
        json!({ "file_path": "kitchen/manifests/train.jsonl" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["url"],
        "https://test-datasets.s3.test/vlm/datasets/kitchen/manifests/train.jsonl?X-Amz-Expires=3600"
    );
    assert_eq!(json["file_path"], "kitchen/manifests/train.jsonl");
    assert!(json["expires_at"].is_string());
    assert_eq!(
        bucket.calls(),
        vec!["presign_get vlm/datasets/kitchen/manifests/train.jsonl"]
    );
}

#[tokio::test]
async fn presigned_url_accepts_listed_key() {
    let bucket = sample_bucket();
    let response = post_json(
        build_test_app(bucket.clone()),
        "/downloads/presigned-url",
        json!({ "file_path": "vlm/datasets/kitchen/meta/stats.json", "expires_in": 60 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let url = body_json(response).await["url"].as_str().unwrap().to_string();
    assert!(url.ends_with("vlm/datasets/kitchen/meta/stats.json?X-Amz-Expires=60"));
}

#[tokio::test]
async fn presigned_url_rejects_out_of_range_expiry() {
    for expires_in in [59, 604_801] {
        let bucket = sample_bucket();
        let response = post_json(
            build_test_app(bucket.clone()),
            "/downloads/presigned-url",
            json!({ "file_path": "kitchen/meta/stats.json", "expires_in": expires_in }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "expires_in={expires_in}");
        assert!(bucket.calls().is_empty());
    }
}

#[tokio::test]
async fn presigned_url_rejects_unsafe_paths() {
    for file_path in ["", "/etc/passwd", "kitchen/../../secrets.txt"] {
        let response = post_json(
            build_test_app(sample_bucket()),
            "/downloads/presigned-url",
            json!({ "file_path": file_path }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "file_path={file_path:?}");
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn cloudfront_signer_issues_signed_cdn_urls() {
    let bucket = sample_bucket();
    let response = post_json(
        build_test_app_with_config(cloudfront_config(), bucket.clone()),
        "/downloads/presigned-url",
        json!({ "file_path": "kitchen/shards/rgb/000000.tar", "expires_in": 600 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let url = json["url"].as_str().unwrap();
    let expires = chrono::DateTime::parse_from_rfc3339(json["expires_at"].as_str().unwrap())
        .unwrap()
        .timestamp();
    assert!(url.starts_with(
        "https://d111.cloudfront.net/vlm/datasets/kitchen/shards/rgb/000000.tar?Expires="
    ));
    assert!(url.contains(&format!("Expires={expires}&Signature=")));
    assert!(url.ends_with("&Key-Pair-Id=K2JCJMDEHXQW5F"));
    assert!(bucket.calls().is_empty());
}

#[tokio::test]
async fn cloudfront_domain_without_key_pair_falls_back_to_presigning() {
    let bucket = sample_bucket();
    let config = efference_serve::config::ServeConfig {
        cloudfront_domain: Some("d111.cloudfront.net".to_string()),
        ..test_config()
    };
    let response = post_json(
        build_test_app_with_config(config, bucket.clone()),
        "/downloads/presigned-url",
        json!({ "file_path": "kitchen/shards/rgb/000000.tar" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["url"]
        .as_str()
        .unwrap()
        .starts_with("https://test-datasets.s3.test/vlm/datasets/kitchen/shards/rgb/000000.tar"));
    assert_eq!(
        bucket.calls(),
        vec!["presign_get vlm/datasets/kitchen/shards/rgb/000000.tar"]
    );
}

#[tokio::test]
async fn unreadable_cloudfront_key_falls_back_to_presigning() {
    let bucket = sample_bucket();
    let config = efference_serve::config::ServeConfig {
        cloudfront_private_key_path: Some("/nonexistent/cloudfront.pem".to_string()),
        ..cloudfront_config()
    };
    let response = post_json(
        build_test_app_with_config(config, bucket.clone()),
        "/downloads/presigned-url",
        json!({ "file_path": "kitchen/meta/stats.json" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(bucket.calls(), vec!["presign_get vlm/datasets/kitchen/meta/stats.json"]);
}
