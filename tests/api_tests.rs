use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::json;
use uuid::Uuid;

use lonier_media_server::asset::handlers;
use lonier_media_server::asset::models::Asset;
use lonier_media_server::asset::store::{AssetStore, UploadOptions, REORDER_STRIDE};
use lonier_media_server::blob::{BlobPayload, FsBlobBackend};
use lonier_media_server::catalog::AssetCatalog;
use lonier_media_server::config::AppConfig;
use lonier_media_server::hero;
use lonier_media_server::state::AppState;
use lonier_media_server::ErrorResponse;

fn test_state(dir: &tempfile::TempDir) -> AppState {
    let spool_dir = dir.path().join("tmp");
    std::fs::create_dir_all(&spool_dir).expect("spool dir");
    let backend = Arc::new(FsBlobBackend::new(dir.path().join("blobs")).expect("backend"));
    let store = Arc::new(AssetStore::new(AssetCatalog::new(), backend));
    let config = AppConfig {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    AppState::new_with_store(store, config, spool_dir).expect("state")
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .service(
                    web::scope("/api")
                        .service(
                            web::resource("/assets/reorder")
                                .route(web::post().to(handlers::reorder_assets)),
                        )
                        .service(
                            web::resource("/assets/section/{section}")
                                .route(web::get().to(handlers::list_section_assets)),
                        )
                        .service(
                            web::resource("/assets/{id}/order")
                                .route(web::patch().to(handlers::patch_asset_order)),
                        )
                        .service(
                            web::resource("/assets/{id}")
                                .route(web::get().to(handlers::get_asset_by_id))
                                .route(web::delete().to(handlers::delete_asset)),
                        )
                        .service(
                            web::resource("/hero")
                                .route(web::get().to(hero::handlers::get_hero_slides)),
                        ),
                )
                .service(
                    web::resource("/assets/content/{id}")
                        .route(web::get().to(handlers::serve_asset_content)),
                ),
        )
        .await
    };
}

fn hero_image_opts(order: i64) -> UploadOptions {
    UploadOptions {
        filename: "slide.jpg".to_string(),
        content_type: None,
        category: "hero".to_string(),
        section: Some("hero-home".to_string()),
        slug: None,
        order: Some(order),
        poster_asset_id: None,
        seeded: false,
    }
}

#[actix_web::test]
async fn get_missing_asset_returns_not_found_body() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/api/assets/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "NotFound");
}

#[actix_web::test]
async fn patch_order_invalidates_the_section_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let asset = state
        .store
        .upload(BlobPayload::Buffered(b"img".to_vec()), hero_image_opts(100))
        .await
        .expect("upload");
    let app = init_app!(state);

    // Prime the cache
    let req = test::TestRequest::get()
        .uri("/api/assets/section/hero-home")
        .to_request();
    let listed: Vec<Asset> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed[0].order, 100);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/assets/{}/order", asset.id))
        .set_json(json!({ "order": 700 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/assets/section/hero-home")
        .to_request();
    let listed: Vec<Asset> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed[0].order, 700);
}

#[actix_web::test]
async fn delete_is_not_repeatable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let asset = state
        .store
        .upload(BlobPayload::Buffered(b"img".to_vec()), hero_image_opts(0))
        .await
        .expect("upload");
    let app = init_app!(state);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/assets/{}", asset.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/assets/{}", asset.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn reorder_endpoint_renumbers_with_stride() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let mut ids = Vec::new();
    for order in [300, 100, 200] {
        let asset = state
            .store
            .upload(
                BlobPayload::Buffered(b"img".to_vec()),
                hero_image_opts(order),
            )
            .await
            .expect("upload");
        ids.push(asset.id);
    }
    let app = init_app!(state);

    let target = vec![ids[1], ids[2], ids[0]];
    let req = test::TestRequest::post()
        .uri("/api/assets/reorder")
        .set_json(json!({ "ids": target }))
        .to_request();
    let updated: Vec<Asset> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        updated.iter().map(|a| a.order).collect::<Vec<_>>(),
        vec![REORDER_STRIDE, 2 * REORDER_STRIDE, 3 * REORDER_STRIDE]
    );
}

#[actix_web::test]
async fn hero_endpoint_serves_the_fallback_when_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/hero").to_request();
    let slides: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let slides = slides.as_array().expect("array");
    assert_eq!(slides.len(), 1);
    assert!(slides[0]["id"].is_null());
    assert_eq!(slides[0]["pinned"], json!(true));
}

#[actix_web::test]
async fn content_endpoint_streams_the_stored_bytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let asset = state
        .store
        .upload(
            BlobPayload::Buffered(b"binary image payload".to_vec()),
            hero_image_opts(0),
        )
        .await
        .expect("upload");
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/assets/content/{}", asset.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").map(|v| v.to_str().unwrap()),
        Some("image/jpeg")
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"binary image payload");
}
