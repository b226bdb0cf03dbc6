//! Integration tests for the `/api/v1/assets` endpoints.
//!
//! Runs the full router (middleware included) over in-memory row and blob
//! stores, so no database is needed.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete, get, multipart_body, patch_json, post_json,
    post_multipart,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_folder(app: &axum::Router, name: &str, parent_id: Option<i64>) -> Value {
    let response = post_json(
        app,
        "/api/v1/assets/folders",
        json!({ "name": name, "parent_id": parent_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "creating folder {name}");
    body_json(response).await["data"].clone()
}

fn id_of(asset: &Value) -> i64 {
    asset["id"].as_i64().unwrap()
}

fn names(list: &Value) -> Vec<String> {
    list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_folder_returns_201_with_envelope() {
    let app = build_test_app();

    let folder = create_folder(&app.router, "  Docs  ", None).await;
    assert_eq!(folder["kind"], "folder");
    assert_eq!(folder["name"], "Docs");
    assert!(folder["parent_id"].is_null());
    assert!(folder["content_ref"].is_null());
}

#[tokio::test]
async fn create_under_missing_parent_is_invalid_parent() {
    let app = build_test_app();

    let response = post_json(
        &app.router,
        "/api/v1/assets/folders",
        json!({ "name": "orphan", "parent_id": 999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_PARENT");
    assert_eq!(app.repo.len().await, 0);
}

#[tokio::test]
async fn duplicate_sibling_name_is_409() {
    let app = build_test_app();
    create_folder(&app.router, "Docs", None).await;

    let response = post_json(&app.router, "/api/v1/assets/folders", json!({ "name": "docs" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn blank_name_is_validation_error() {
    let app = build_test_app();

    let response = post_json(&app.router, "/api/v1/assets/folders", json!({ "name": "   " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_creates_one_asset_per_file() {
    let app = build_test_app();
    let folder = create_folder(&app.router, "Images", None).await;
    let parent = id_of(&folder).to_string();

    let body = multipart_body(
        Some(&parent),
        &[
            ("cat.png", "image/png", b"png-bytes".as_slice()),
            ("model.safetensors", "application/octet-stream", b"weights".as_slice()),
        ],
    );
    let response = post_multipart(&app.router, "/api/v1/assets/upload", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let outcomes = json["data"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o["status"] == "created"));

    let cat = &outcomes[0]["asset"];
    assert_eq!(cat["name"], "cat.png");
    assert_eq!(cat["kind"], "file");
    assert_eq!(cat["parent_id"], id_of(&folder));
    assert_eq!(cat["media_kind"], "image");
    assert_eq!(cat["size_bytes"], 9);
    assert_eq!(outcomes[1]["asset"]["media_kind"], "model");

    assert_eq!(app.blobs.len().await, 2);
    assert!(app.blobs.contains(cat["content_ref"].as_str().unwrap()).await);
}

#[tokio::test]
async fn upload_reports_per_file_failures_with_207() {
    let app = build_test_app();

    let body = multipart_body(
        None,
        &[
            ("a.txt", "text/plain", b"one".as_slice()),
            ("A.TXT", "text/plain", b"two".as_slice()),
        ],
    );
    let response = post_multipart(&app.router, "/api/v1/assets/upload", body).await;
    assert_eq!(response.status(), StatusCode::MULTI_STATUS);

    let json = body_json(response).await;
    let outcomes = json["data"].as_array().unwrap();
    assert_eq!(outcomes[0]["status"], "created");
    assert_eq!(outcomes[1]["status"], "failed");
    assert_eq!(outcomes[1]["code"], "CONFLICT");
    assert_eq!(outcomes[1]["file_name"], "A.TXT");

    // The rejected file never reached the blob store.
    assert_eq!(app.blobs.len().await, 1);
}

#[tokio::test]
async fn upload_into_file_parent_fails_whole_batch() {
    let app = build_test_app();

    let body = multipart_body(None, &[("a.txt", "text/plain", b"one".as_slice())]);
    let response = post_multipart(&app.router, "/api/v1/assets/upload", body).await;
    let file_id = body_json(response).await["data"][0]["asset"]["id"]
        .as_i64()
        .unwrap();

    let body = multipart_body(Some(&file_id.to_string()), &[("b.txt", "text/plain", b"two".as_slice())]);
    let response = post_multipart(&app.router, "/api/v1/assets/upload", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_PARENT");
    assert_eq!(app.blobs.len().await, 1);
}

#[tokio::test]
async fn upload_without_files_is_rejected() {
    let app = build_test_app();

    let body = multipart_body(Some(""), &[]);
    let response = post_multipart(&app.router, "/api/v1/assets/upload", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn upload_with_garbage_parent_id_is_bad_request() {
    let app = build_test_app();

    let body = multipart_body(Some("not-a-number"), &[("a.txt", "text/plain", b"x".as_slice())]);
    let response = post_multipart(&app.router, "/api/v1/assets/upload", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_puts_folders_first_then_alphabetical() {
    let app = build_test_app();
    let root = create_folder(&app.router, "root", None).await;
    let root_id = id_of(&root);

    create_folder(&app.router, "b", Some(root_id)).await;
    create_folder(&app.router, "a", Some(root_id)).await;
    let body = multipart_body(
        Some(&root_id.to_string()),
        &[("z", "text/plain", b"z".as_slice()), ("y", "text/plain", b"y".as_slice())],
    );
    post_multipart(&app.router, "/api/v1/assets/upload", body).await;

    let response = get(&app.router, &format!("/api/v1/assets?parent_id={root_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(names(&body_json(response).await), vec!["a", "b", "y", "z"]);

    let response = get(&app.router, &format!("/api/v1/assets?parent_id={root_id}&kind=file")).await;
    assert_eq!(names(&body_json(response).await), vec!["y", "z"]);

    let response = get(&app.router, "/api/v1/assets").await;
    assert_eq!(names(&body_json(response).await), vec!["root"]);
}

#[tokio::test]
async fn get_and_path_return_breadcrumb() {
    let app = build_test_app();
    let a = create_folder(&app.router, "A", None).await;
    let b = create_folder(&app.router, "B", Some(id_of(&a))).await;

    let response = get(&app.router, &format!("/api/v1/assets/{}", id_of(&b))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "B");

    let response = get(&app.router, &format!("/api/v1/assets/{}/path", id_of(&b))).await;
    assert_eq!(names(&body_json(response).await), vec!["A", "B"]);
}

#[tokio::test]
async fn unknown_asset_is_404() {
    let app = build_test_app();

    let response = get(&app.router, "/api/v1/assets/12345").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Asset with id 12345 not found");
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_moves_between_folders_and_back_to_root() {
    let app = build_test_app();
    let a = create_folder(&app.router, "A", None).await;
    let b = create_folder(&app.router, "B", None).await;
    let uri = format!("/api/v1/assets/{}", id_of(&b));

    let response = patch_json(&app.router, &uri, json!({ "parent_id": id_of(&a) })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["parent_id"], id_of(&a));

    // Omitted parent_id leaves the asset in place.
    let response = patch_json(&app.router, &uri, json!({ "name": "Renamed" })).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Renamed");
    assert_eq!(json["data"]["parent_id"], id_of(&a));

    // Explicit null moves it to the root.
    let response = patch_json(&app.router, &uri, json!({ "parent_id": null })).await;
    assert!(body_json(response).await["data"]["parent_id"].is_null());
}

#[tokio::test]
async fn patch_rejects_cycles_and_leaves_asset_unchanged() {
    let app = build_test_app();
    let a = create_folder(&app.router, "A", None).await;
    let b = create_folder(&app.router, "B", Some(id_of(&a))).await;
    let c = create_folder(&app.router, "C", Some(id_of(&b))).await;

    let uri = format!("/api/v1/assets/{}", id_of(&a));
    let response = patch_json(&app.router, &uri, json!({ "parent_id": id_of(&c) })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_PARENT");

    let response = patch_json(&app.router, &uri, json!({ "parent_id": id_of(&a) })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app.router, &uri).await;
    assert!(body_json(response).await["data"]["parent_id"].is_null());
}

#[tokio::test]
async fn patch_rename_into_conflict_is_409() {
    let app = build_test_app();
    create_folder(&app.router, "Docs", None).await;
    let other = create_folder(&app.router, "Other", None).await;

    let uri = format!("/api/v1/assets/{}", id_of(&other));
    let response = patch_json(&app.router, &uri, json!({ "name": "DOCS" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn patch_pointing_at_another_assets_blob_is_rejected() {
    let app = build_test_app();
    let body = multipart_body(
        None,
        &[
            ("a.png", "image/png", b"a".as_slice()),
            ("b.png", "image/png", b"b".as_slice()),
        ],
    );
    let json = body_json(post_multipart(&app.router, "/api/v1/assets/upload", body).await).await;
    let a = &json["data"][0]["asset"];
    let b = &json["data"][1]["asset"];

    let uri = format!("/api/v1/assets/{}", id_of(b));
    let response = patch_json(&app.router, &uri, json!({ "preview_ref": a["content_ref"] })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = get(&app.router, &uri).await;
    assert!(body_json(response).await["data"]["preview_ref"].is_null());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_subtree_and_blobs() {
    let app = build_test_app();
    let a = create_folder(&app.router, "A", None).await;
    let b = create_folder(&app.router, "B", Some(id_of(&a))).await;
    let keep = create_folder(&app.router, "Keep", None).await;

    let body = multipart_body(Some(&id_of(&b).to_string()), &[("c.png", "image/png", b"c".as_slice())]);
    post_multipart(&app.router, "/api/v1/assets/upload", body).await;
    let body = multipart_body(Some(&id_of(&keep).to_string()), &[("d.png", "image/png", b"d".as_slice())]);
    post_multipart(&app.router, "/api/v1/assets/upload", body).await;
    assert_eq!(app.blobs.len().await, 2);

    let response = delete(&app.router, &format!("/api/v1/assets/{}", id_of(&a))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(app.blobs.len().await, 1);
    let response = get(&app.router, &format!("/api/v1/assets/{}", id_of(&b))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = get(&app.router, &format!("/api/v1/assets/{}", id_of(&keep))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete(&app.router, &format!("/api/v1/assets/{}", id_of(&a))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_succeeds_when_blob_cleanup_fails() {
    let app = build_test_app();
    let body = multipart_body(None, &[("a.bin", "application/octet-stream", b"x".as_slice())]);
    let response = post_multipart(&app.router, "/api/v1/assets/upload", body).await;
    let asset = body_json(response).await["data"][0]["asset"].clone();

    app.blobs
        .fail_delete_of(asset["content_ref"].as_str().unwrap())
        .await;

    let response = delete(&app.router, &format!("/api/v1/assets/{}", id_of(&asset))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.repo.is_empty().await);
}
