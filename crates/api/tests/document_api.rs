//! HTTP-level integration tests for document upload and versioning.

mod common;

use axum::http::StatusCode;
use common::{assert_status, delete, get, post_multipart, put_json, Part};
use sqlx::PgPool;

const PDF_BYTES: &[u8] = b"%PDF-1.4 test document";

async fn upload_document(
    pool: &PgPool,
    token: &str,
    title: &str,
    visibility: &str,
) -> serde_json::Value {
    let (app, _store) = common::build_test_app_with_store(
        pool.clone(),
        std::sync::Arc::new(portal_storage::memory::MemoryObjectStore::new()),
    );
    let response = post_multipart(
        app,
        "/api/v1/documents",
        Some(token),
        &[
            Part::Text {
                name: "title",
                value: title,
            },
            Part::Text {
                name: "visibility",
                value: visibility,
            },
            Part::File {
                name: "file",
                file_name: "rapport.pdf",
                content_type: "application/pdf",
                bytes: PDF_BYTES,
            },
        ],
    )
    .await;
    assert_status(response, StatusCode::CREATED).await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_upload_creates_document_and_v1(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    let json = upload_document(&pool, &token, "Årsrapport 2025", "authenticated").await;
    let id = json["id"].as_i64().unwrap();
    assert_eq!(json["title"], "Årsrapport 2025");
    assert!(json["file_path"].as_str().unwrap().starts_with("documents/"));

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/documents/{id}"), Some(&token)).await;
    let json = assert_status(response, StatusCode::OK).await;
    let versions = json["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0]["version_label"], "v1");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_disallowed_file_type_is_rejected(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_multipart(
        app,
        "/api/v1/documents",
        Some(&token),
        &[
            Part::Text {
                name: "title",
                value: "Skript",
            },
            Part::File {
                name: "file",
                file_name: "virus.exe",
                content_type: "application/x-msdownload",
                bytes: b"MZ",
            },
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_new_version_defaults_to_next_label_and_moves_head(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    let document = upload_document(&pool, &token, "Prospekt", "authenticated").await;
    let id = document["id"].as_i64().unwrap();
    let first_path = document["file_path"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_multipart(
        app,
        &format!("/api/v1/documents/{id}/versions"),
        Some(&token),
        &[Part::File {
            name: "file",
            file_name: "prospekt-v2.pdf",
            content_type: "application/pdf",
            bytes: PDF_BYTES,
        }],
    )
    .await;
    let version = assert_status(response, StatusCode::CREATED).await;
    assert_eq!(version["version_label"], "v2");

    // The head row now points at the new file; both versions remain.
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/documents/{id}"), Some(&token)).await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_ne!(json["document"]["file_path"], first_path);
    assert_eq!(json["document"]["file_name"], "prospekt-v2.pdf");
    assert_eq!(json["versions"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_explicit_version_label_wins(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    let document = upload_document(&pool, &token, "Prospekt", "authenticated").await;
    let id = document["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = post_multipart(
        app,
        &format!("/api/v1/documents/{id}/versions"),
        Some(&token),
        &[
            Part::Text {
                name: "version_label",
                value: "2026-Q1",
            },
            Part::File {
                name: "file",
                file_name: "prospekt.pdf",
                content_type: "application/pdf",
                bytes: PDF_BYTES,
            },
        ],
    )
    .await;
    let version = assert_status(response, StatusCode::CREATED).await;
    assert_eq!(version["version_label"], "2026-Q1");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_version_metadata_patch(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    let document = upload_document(&pool, &token, "Prospekt", "authenticated").await;
    let id = document["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/documents/{id}"), Some(&token)).await;
    let json = assert_status(response, StatusCode::OK).await;
    let version_id = json["versions"][0]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/documents/versions/{version_id}"),
        Some(&token),
        serde_json::json!({"version_label": "Endelig", "description": "Signert utgave"}),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["version_label"], "Endelig");
    assert_eq!(json["description"], "Signert utgave");

    // An empty patch is a no-op, not an error.
    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/documents/versions/{version_id}"),
        Some(&token),
        serde_json::json!({}),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["version_label"], "Endelig");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_viewer_listing_hides_admin_only_documents(pool: PgPool) {
    let (_eid, editor_token) = common::seed_editor(&pool).await;
    let (_vid, viewer_token) = common::seed_viewer(&pool).await;

    upload_document(&pool, &editor_token, "Intern kalkyle", "admin_only").await;
    upload_document(&pool, &editor_token, "Årsrapport", "authenticated").await;

    // The editor sees both.
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/documents", Some(&editor_token)).await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    // The viewer only sees the authenticated document.
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/documents", Some(&viewer_token)).await;
    let json = assert_status(response, StatusCode::OK).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Årsrapport");

    // Direct access to the admin-only document is forbidden for viewers.
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/documents", Some(&editor_token)).await;
    let json = assert_status(response, StatusCode::OK).await;
    let admin_only_id = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["visibility"] == "admin_only")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let app = common::build_test_app(pool);
    let response = get(
        app,
        &format!("/api/v1/documents/{admin_only_id}"),
        Some(&viewer_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_viewer_cannot_upload(pool: PgPool) {
    let (_id, token) = common::seed_viewer(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_multipart(
        app,
        "/api/v1/documents",
        Some(&token),
        &[
            Part::Text {
                name: "title",
                value: "Nei",
            },
            Part::File {
                name: "file",
                file_name: "rapport.pdf",
                content_type: "application/pdf",
                bytes: PDF_BYTES,
            },
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_document_removes_rows(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    let document = upload_document(&pool, &token, "Slett meg", "authenticated").await;
    let id = document["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/documents/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/documents/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
