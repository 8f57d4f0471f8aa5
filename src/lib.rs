use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod asset;
pub mod blob;
pub mod catalog;
pub mod config;
pub mod error;
pub mod hero;
pub mod seed;
pub mod state;

pub use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::asset::handlers::upload_asset,
        crate::asset::handlers::replace_asset,
        crate::asset::handlers::patch_asset_order,
        crate::asset::handlers::reorder_assets,
        crate::asset::handlers::delete_asset,
        crate::asset::handlers::get_asset_by_id,
        crate::asset::handlers::get_asset_by_slug,
        crate::asset::handlers::list_section_assets,
        crate::asset::handlers::serve_asset_content,
        crate::hero::handlers::get_hero_slides
    ),
    components(
        schemas(
            asset::models::Asset,
            asset::models::MediaKind,
            asset::models::UploadAssetRequest,
            asset::models::ReplaceAssetRequest,
            asset::models::PatchOrderRequest,
            asset::models::ReorderRequest,
            hero::HeroSlide,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Asset Store", description = "Media asset upload, replace, ordering and lookup endpoints."),
        (name = "Hero", description = "Aggregated home-page hero slider sequence.")
    ),
    servers(
        (url = "https://media.lonier.com", description = "Production server"),
        (url = "http://127.0.0.1:8080", description = "Localhost Staging server")
    )
)]
struct ApiDoc;

pub async fn run() -> std::io::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    dotenvy::dotenv().ok(); // Load .env file
    let app_state = match AppState::new().await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to initialize media store. Please check MEDIA_DATA_DIR and its permissions. Error: {}",
                e
            );
            std::process::exit(1);
        }
    };
    let bind_addr = app_state.config.bind_addr.clone();
    let port = app_state.config.port;

    let prometheus = PrometheusMetricsBuilder::new("lonier_media_server")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus metrics middleware");

    log::info!("Starting server at http://{}:{}", bind_addr, port);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = Cors::default()
            .allowed_origin("https://lonier.com")
            .allowed_origin("https://www.lonier.com")
            .allowed_origin("https://admin.lonier.com")
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(
                web::scope("/api")
                    .service(
                        web::resource("/assets")
                            .route(web::post().to(asset::handlers::upload_asset)),
                    )
                    .service(
                        web::resource("/assets/reorder")
                            .route(web::post().to(asset::handlers::reorder_assets)),
                    )
                    .service(
                        web::resource("/assets/section/{section}")
                            .route(web::get().to(asset::handlers::list_section_assets)),
                    )
                    .service(
                        web::resource("/assets/slug/{slug}")
                            .route(web::get().to(asset::handlers::get_asset_by_slug)),
                    )
                    .service(
                        web::resource("/assets/{id}/order")
                            .route(web::patch().to(asset::handlers::patch_asset_order)),
                    )
                    .service(
                        web::resource("/assets/{id}")
                            .route(web::get().to(asset::handlers::get_asset_by_id))
                            .route(web::put().to(asset::handlers::replace_asset))
                            .route(web::delete().to(asset::handlers::delete_asset)),
                    )
                    .service(
                        web::resource("/hero").route(web::get().to(hero::handlers::get_hero_slides)),
                    ),
            )
            .service(
                web::resource("/assets/content/{id}")
                    .route(web::get().to(asset::handlers::serve_asset_content)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .backlog(8192)
    .max_connections(25000)
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((bind_addr, port))?
    .run()
    .await
}
