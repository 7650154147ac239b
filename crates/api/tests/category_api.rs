//! HTTP-level integration tests for category ordering rules.

mod common;

use axum::http::StatusCode;
use common::{assert_status, get, post_json, put_json};
use sqlx::PgPool;

async fn create_category(
    pool: &PgPool,
    token: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/project-categories", Some(token), body).await;
    assert_status(response, StatusCode::CREATED).await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_first_category_gets_sort_order_one(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    let json = create_category(&pool, &token, serde_json::json!({"name": "Bolig"})).await;
    assert_eq!(json["category"]["sort_order"], 1);
    assert_eq!(json["category"]["slug"], "bolig");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_default_order_is_max_plus_one(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    // {1, 3} with a gap; the next default lands at 4, not in the gap.
    create_category(&pool, &token, serde_json::json!({"name": "Bolig", "sort_order": 1})).await;
    create_category(&pool, &token, serde_json::json!({"name": "Næring", "sort_order": 3})).await;
    let json = create_category(&pool, &token, serde_json::json!({"name": "Hotell"})).await;

    assert_eq!(json["category"]["sort_order"], 4);

    // Final display order matches (sort_order asc, name asc).
    let names: Vec<String> = json["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Bolig", "Næring", "Hotell"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_category_slug_transliterates_norwegian_letters(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    let json = create_category(&pool, &token, serde_json::json!({"name": "Næringsbygg"})).await;
    assert_eq!(json["category"]["slug"], "naeringsbygg");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reorder_updates_only_sort_order(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    let bolig = create_category(&pool, &token, serde_json::json!({"name": "Bolig"})).await;
    let hotell = create_category(&pool, &token, serde_json::json!({"name": "Hotell"})).await;
    let bolig_id = bolig["category"]["id"].as_i64().unwrap();
    let hotell_id = hotell["category"]["id"].as_i64().unwrap();

    // Move Hotell ahead of Bolig.
    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/project-categories/{hotell_id}/order"),
        Some(&token),
        serde_json::json!({"sort_order": 0}),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    assert_eq!(json["category"]["name"], "Hotell");
    assert_eq!(json["category"]["sort_order"], 0);

    let names: Vec<String> = json["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Hotell", "Bolig"]);

    // Clearing the order sends Bolig to the unranked tail.
    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/project-categories/{bolig_id}/order"),
        Some(&token),
        serde_json::json!({"sort_order": null}),
    )
    .await;
    let json = assert_status(response, StatusCode::OK).await;
    let names: Vec<String> = json["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Hotell", "Bolig"]);
    assert!(json["categories"][1]["sort_order"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_listing_is_display_ordered(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    create_category(&pool, &token, serde_json::json!({"name": "Næring", "sort_order": 2})).await;
    create_category(&pool, &token, serde_json::json!({"name": "Bolig", "sort_order": 2})).await;
    create_category(&pool, &token, serde_json::json!({"name": "Annet"})).await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/project-categories", Some(&token)).await;
    let json = assert_status(response, StatusCode::OK).await;

    let names: Vec<String> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    // Equal ranks tie-break on name; "Annet" got max+1 = 3.
    assert_eq!(names, ["Bolig", "Næring", "Annet"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_viewer_cannot_create_categories(pool: PgPool) {
    let (_id, token) = common::seed_viewer(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/project-categories",
        Some(&token),
        serde_json::json!({"name": "Bolig"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_document_category_defaults_to_end_of_list(pool: PgPool) {
    let (_id, token) = common::seed_editor(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/document-categories",
        Some(&token),
        serde_json::json!({"name": "Årsrapporter"}),
    )
    .await;
    let json = assert_status(response, StatusCode::CREATED).await;
    assert_eq!(json["sort_order"], 1);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/document-categories",
        Some(&token),
        serde_json::json!({"name": "Prospekter"}),
    )
    .await;
    let json = assert_status(response, StatusCode::CREATED).await;
    assert_eq!(json["sort_order"], 2);
}
