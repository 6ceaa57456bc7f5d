mod common;

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use clubhub_api::models::bucket::BucketSpec;
use common::{TestApp, ADMIN_TOKEN, OWNER_TOKEN};
use serde_json::json;

const URI: &str = "/functions/v1/create-storage-bucket";

#[tokio::test]
async fn creates_product_bucket_with_its_profile() {
    let app = TestApp::new();

    let (status, body) = app.post(URI, Some(ADMIN_TOKEN), json!({ "bucketName": "media-fin" })).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["bucket"], "media-fin");
    assert_eq!(body["existed"], false);
    let spec = app.objects.bucket("media-fin").unwrap();
    assert!(spec.public);
    assert_eq!(spec.file_size_limit, 5 * 1024 * 1024);
}

#[tokio::test]
async fn existing_bucket_is_success() {
    let app = TestApp::new();
    app.objects.insert(BucketSpec::tenant("club-legacy"));

    let (status, body) = app.post(URI, Some(ADMIN_TOKEN), json!({ "bucketName": "club-legacy" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["existed"], true);
    assert_eq!(body["message"], "Storage bucket already exists");
    assert_eq!(app.objects.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn repeated_requests_hit_the_cache() {
    let app = TestApp::new();

    app.post(URI, Some(ADMIN_TOKEN), json!({ "bucketName": "media-academy" })).await;
    let (status, body) = app.post(URI, Some(ADMIN_TOKEN), json!({ "bucketName": "media-academy" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["existed"], true);
    assert_eq!(app.objects.checks.load(Ordering::SeqCst), 1);
    assert_eq!(app.objects.creates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn club_bucket_is_registered_for_usage_tracking() {
    let app = TestApp::new();

    let (status, body) = app
        .post(URI, Some(ADMIN_TOKEN), json!({ "bucketName": "club-olympiacos-youth" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("warnings").is_none());
    assert_eq!(app.tenants.tracked_club("club-olympiacos-youth"), Some(app.club_id));
}

#[tokio::test]
async fn tracking_failure_becomes_a_warning() {
    let app = TestApp::new();
    app.tenants.fail_tracking.store(true, Ordering::SeqCst);

    let (status, body) = app
        .post(URI, Some(ADMIN_TOKEN), json!({ "bucketName": "club-olympiacos-youth" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn storage_failure_is_a_500() {
    let app = TestApp::new();
    app.objects.fail_create.store(true, Ordering::SeqCst);

    let (status, body) = app.post(URI, Some(ADMIN_TOKEN), json!({ "bucketName": "media-sportiko" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create bucket");
}

#[tokio::test]
async fn only_super_admins_may_create_buckets() {
    let app = TestApp::new();

    let (status, body) = app.post(URI, Some(OWNER_TOKEN), json!({ "bucketName": "media-fin" })).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Only super admins can create storage buckets");
    assert!(app.objects.bucket("media-fin").is_none());
}

#[tokio::test]
async fn bucket_name_is_validated() {
    let app = TestApp::new();

    for payload in [json!({}), json!({ "bucketName": "" }), json!({ "bucketName": "Bad Name" })] {
        let (status, _) = app.post(URI, Some(ADMIN_TOKEN), payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    assert_eq!(app.objects.creates.load(Ordering::SeqCst), 0);
}
