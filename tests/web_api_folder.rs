//! Web API Folder Tests
//!
//! Integration tests for the folder tree, folder mutations, zip downloads
//! and folder PINs.

mod common;

use axum::http::{header, StatusCode};
use serde_json::{json, Value};

use common::{create_test_server, error_code, folder_route, upload_file, upload_jpeg};

#[tokio::test]
async fn test_create_folder() {
    let (server, lib) = create_test_server();

    let response = server
        .post("/api/folders")
        .json(&json!({ "folderName": "trip/day1" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": true, "folderName": "trip/day1" })
    );
    assert!(lib.upload_dir().join("trip").join("day1").is_dir());

    let tree = server.get("/api/folders").await.json::<Value>();
    assert_eq!(tree.as_array().unwrap().len(), 1);
    assert_eq!(tree[0]["name"], "trip");
    assert_eq!(tree[0]["subfolderCount"], 1);
    assert_eq!(tree[0]["subfolders"][0]["path"], "trip/day1");
    assert_eq!(tree[0]["subfolders"][0]["parentPath"], "trip");
}

#[tokio::test]
async fn test_create_folder_sanitizes_segments() {
    let (server, _lib) = create_test_server();

    let response = server
        .post("/api/folders")
        .json(&json!({ "folderName": "my:photos/ best? " }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["folderName"], "my_photos/best_");
}

#[tokio::test]
async fn test_create_folder_invalid() {
    let (server, _lib) = create_test_server();

    for name in ["", "../escape", "thumbnails"] {
        let response = server
            .post("/api/folders")
            .json(&json!({ "folderName": name }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let tree = server.get("/api/folders").await.json::<Value>();
    assert_eq!(tree, json!([]));
}

#[tokio::test]
async fn test_folder_tree_includes_ancestors() {
    let (server, _lib) = create_test_server();
    upload_jpeg(&server, "deep.jpg", Some("a/b/c")).await;

    let tree = server.get("/api/folders").await.json::<Value>();

    assert_eq!(tree[0]["path"], "a");
    assert_eq!(tree[0]["fileCount"], 0);
    assert_eq!(tree[0]["subfolders"][0]["path"], "a/b");
    assert_eq!(tree[0]["subfolders"][0]["subfolders"][0]["path"], "a/b/c");
    assert_eq!(tree[0]["subfolders"][0]["subfolders"][0]["fileCount"], 1);
}

#[tokio::test]
async fn test_get_folder_contents() {
    let (server, _lib) = create_test_server();
    upload_jpeg(&server, "photo.jpg", Some("trip/day1")).await;

    let response = server.get(&folder_route("trip/day1", "/contents")).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["name"], "day1");
    assert_eq!(body["path"], "trip/day1");
    assert_eq!(body["fileCount"], 1);
    assert_eq!(body["files"][0]["originalName"], "photo.jpg");
    assert_eq!(body["isLocked"], false);

    let response = server.get(&folder_route("nowhere", "/contents")).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(error_code(&response.json::<Value>()), "NOT_FOUND");
}

#[tokio::test]
async fn test_folder_files_direct_only() {
    let (server, _lib) = create_test_server();
    upload_jpeg(&server, "top.jpg", Some("trip")).await;
    upload_jpeg(&server, "nested.jpg", Some("trip/day1")).await;

    let files = server
        .get(&folder_route("trip", "/files"))
        .await
        .json::<Value>();

    assert_eq!(files.as_array().unwrap().len(), 1);
    assert_eq!(files[0]["originalName"], "top.jpg");
}

#[tokio::test]
async fn test_rename_folder() {
    let (server, lib) = create_test_server();
    upload_jpeg(&server, "photo.jpg", Some("trip/day1")).await;
    upload_jpeg(&server, "other.jpg", Some("trip2")).await;

    let response = server
        .patch(&folder_route("trip", "/rename"))
        .json(&json!({ "newName": "vacation" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["newPath"], "vacation");

    let files = server
        .get(&folder_route("vacation/day1", "/files"))
        .await
        .json::<Value>();
    assert_eq!(files[0]["folderPath"], "vacation/day1");
    let stored = files[0]["path"].as_str().unwrap();
    assert!(std::path::Path::new(stored).exists());
    assert!(lib.upload_dir().join("vacation").join("day1").is_dir());
    assert!(!lib.upload_dir().join("trip").exists());

    let untouched = server
        .get(&folder_route("trip2", "/files"))
        .await
        .json::<Value>();
    assert_eq!(untouched[0]["folderPath"], "trip2");
}

#[tokio::test]
async fn test_rename_folder_failures() {
    let (server, _lib) = create_test_server();
    upload_jpeg(&server, "a.jpg", Some("one")).await;
    upload_jpeg(&server, "b.jpg", Some("two")).await;

    let response = server
        .patch(&folder_route("one", "/rename"))
        .json(&json!({ "newName": "two" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let response = server
        .patch(&folder_route("missing", "/rename"))
        .json(&json!({ "newName": "three" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server
        .patch(&folder_route("one", "/rename"))
        .json(&json!({ "newName": ".." }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let files = server
        .get(&folder_route("one", "/files"))
        .await
        .json::<Value>();
    assert_eq!(files[0]["folderPath"], "one");
}

#[tokio::test]
async fn test_delete_folder() {
    let (server, lib) = create_test_server();
    upload_jpeg(&server, "a.jpg", Some("photos")).await;
    upload_jpeg(&server, "b.jpg", Some("photos/2024")).await;
    upload_jpeg(&server, "c.jpg", Some("photos2")).await;

    let response = server.delete(&folder_route("photos", "")).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["deleted"], true);
    assert_eq!(body["deletedFiles"], 2);
    assert!(!lib.upload_dir().join("photos").exists());

    let files = server.get("/api/files").await.json::<Value>();
    assert_eq!(files.as_array().unwrap().len(), 1);
    assert_eq!(files[0]["folderPath"], "photos2");

    let response = server.delete(&folder_route("photos", "")).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_folder_images() {
    let (server, _lib) = create_test_server();
    upload_jpeg(&server, "a.jpg", Some("x")).await;
    upload_jpeg(&server, "b.jpg", Some("x")).await;
    upload_file(&server, "clip.mp4", "video/mp4", b"video", Some("x")).await;
    upload_file(&server, "notes.txt", "text/plain", b"notes", Some("x")).await;
    upload_jpeg(&server, "nested.jpg", Some("x/y")).await;

    let response = server.delete(&folder_route("x", "/images")).await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["deletedCount"], 2);

    let files = server
        .get(&folder_route("x", "/files"))
        .await
        .json::<Value>();
    assert_eq!(files.as_array().unwrap().len(), 2);
    let nested = server
        .get(&folder_route("x/y", "/files"))
        .await
        .json::<Value>();
    assert_eq!(nested.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_download_folder_zip() {
    let (server, _lib) = create_test_server();
    upload_file(&server, "a.txt", "text/plain", b"a", Some("docs")).await;
    upload_file(&server, "b.txt", "text/plain", b"b", Some("docs")).await;

    let response = server.get(&folder_route("docs", "/download")).await;

    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "application/zip");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"docs.zip\""
    );
    assert!(response.as_bytes().starts_with(b"PK"));
}

#[tokio::test]
async fn test_download_folder_failures() {
    let (server, _lib) = create_test_server();
    server
        .post("/api/folders")
        .json(&json!({ "folderName": "empty" }))
        .await
        .assert_status_ok();

    let response = server.get(&folder_route("empty", "/download")).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.get(&folder_route("missing", "/download")).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pin_lifecycle() {
    let (server, _lib) = create_test_server();
    upload_jpeg(&server, "secret.jpg", Some("private")).await;

    let response = server
        .post(&folder_route("private", "/pin"))
        .json(&json!({ "pin": "1234" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["success"], true);

    let tree = server.get("/api/folders").await.json::<Value>();
    assert_eq!(tree[0]["isLocked"], true);
    assert_eq!(tree[0]["hasPin"], true);

    let response = server
        .post(&folder_route("private", "/unlock"))
        .json(&json!({ "pin": "9999" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&response.json::<Value>()), "UNAUTHORIZED");

    let response = server
        .post(&folder_route("private", "/unlock"))
        .json(&json!({ "pin": "1234" }))
        .await;
    response.assert_status_ok();

    let response = server
        .delete(&folder_route("private", "/pin"))
        .json(&json!({ "pin": "0000" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .delete(&folder_route("private", "/pin"))
        .json(&json!({ "pin": "1234" }))
        .await;
    response.assert_status_ok();

    let response = server.delete(&folder_route("private", "/pin")).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server
        .post(&folder_route("private", "/unlock"))
        .json(&json!({ "pin": "1234" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_remove_pin_without_body() {
    let (server, _lib) = create_test_server();
    upload_jpeg(&server, "a.jpg", Some("box")).await;
    server
        .post(&folder_route("box", "/pin"))
        .json(&json!({ "pin": "4321" }))
        .await
        .assert_status_ok();

    let response = server.delete(&folder_route("box", "/pin")).await;

    response.assert_status_ok();
    let tree = server.get("/api/folders").await.json::<Value>();
    assert_eq!(tree[0]["isLocked"], false);
}

#[tokio::test]
async fn test_remove_pin_malformed_body_keeps_pin() {
    let (server, _lib) = create_test_server();
    upload_jpeg(&server, "a.jpg", Some("box")).await;
    server
        .post(&folder_route("box", "/pin"))
        .json(&json!({ "pin": "4321" }))
        .await
        .assert_status_ok();

    let response = server
        .delete(&folder_route("box", "/pin"))
        .json(&json!({ "pin": 1234 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let tree = server.get("/api/folders").await.json::<Value>();
    assert_eq!(tree[0]["isLocked"], true);
}

#[tokio::test]
async fn test_set_pin_invalid() {
    let (server, _lib) = create_test_server();
    upload_jpeg(&server, "a.jpg", Some("box")).await;

    for pin in ["12", "123456789", "abcd"] {
        let response = server
            .post(&folder_route("box", "/pin"))
            .json(&json!({ "pin": pin }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let response = server
        .post(&folder_route("ghost", "/pin"))
        .json(&json!({ "pin": "1234" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pin_follows_folder_rename() {
    let (server, _lib) = create_test_server();
    upload_jpeg(&server, "a.jpg", Some("old/inner")).await;
    server
        .post(&folder_route("old/inner", "/pin"))
        .json(&json!({ "pin": "2468" }))
        .await
        .assert_status_ok();

    server
        .patch(&folder_route("old", "/rename"))
        .json(&json!({ "newName": "new" }))
        .await
        .assert_status_ok();

    let response = server
        .post(&folder_route("new/inner", "/unlock"))
        .json(&json!({ "pin": "2468" }))
        .await;
    response.assert_status_ok();

    let response = server
        .post(&folder_route("old/inner", "/unlock"))
        .json(&json!({ "pin": "2468" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
