use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use handlebars::Handlebars;
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{self, admin, health, jerseys, names, pages};
use crate::common::get_handlebars;
use crate::services::JerseyImageService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub images: Option<JerseyImageService>,
    pub hb: Arc<Handlebars<'static>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::names::list_names,
        handlers::names::create_name,
        handlers::names::get_name,
        handlers::names::update_name,
        handlers::names::delete_name,
        handlers::names::random_name,
        handlers::names::names_starting_with,
        handlers::names::names_containing,
        handlers::jerseys::list_jerseys,
        handlers::jerseys::create_jersey,
        handlers::jerseys::get_jersey,
        handlers::jerseys::update_jersey,
        handlers::jerseys::delete_jersey,
    ),
    components(schemas(
        crate::database::entities::derby_names::Model,
        crate::database::entities::derby_jerseys::Model,
        handlers::names::CreateNameRequest,
        handlers::names::UpdateNameRequest,
        handlers::jerseys::CreateJerseyRequest,
        handlers::jerseys::UpdateJerseyRequest,
    )),
    tags(
        (name = "names", description = "Derby name records and search"),
        (name = "jerseys", description = "Jersey designs and generated images")
    )
)]
struct ApiDoc;

pub async fn create_app(
    db: DatabaseConnection,
    cors_origin: Option<&str>,
    media_root: &Path,
    images: Option<JerseyImageService>,
) -> Result<Router> {
    let state = AppState {
        db,
        images,
        hb: Arc::new(get_handlebars()?),
    };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        // Browsing pages
        .route("/", get(pages::index))
        .route("/names/:id", get(pages::name_detail))
        .route("/jerseys", get(pages::jersey_grid))
        // Admin console
        .route("/admin", get(admin::console))
        .route("/admin/names", post(admin::create_name))
        .route("/admin/names/:id/delete", post(admin::delete_name))
        .route("/admin/jerseys", post(admin::create_jersey))
        // API v1 routes
        .nest("/api/v1", api_v1_routes())
        // Stored jersey images
        .nest_service("/media", ServeDir::new(media_root))
        // OpenAPI schema + Swagger UI
        .merge(SwaggerUi::new("/docs").url("/api/v1/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Name routes
        .route("/names", get(names::list_names))
        .route("/names", post(names::create_name))
        .route("/names/random", get(names::random_name))
        .route("/names/starts-with/:prefix", get(names::names_starting_with))
        .route("/names/contains/:substring", get(names::names_containing))
        .route("/names/:id", get(names::get_name))
        .route("/names/:id", put(names::update_name))
        .route("/names/:id", delete(names::delete_name))
        // Jersey routes
        .route("/jerseys", get(jerseys::list_jerseys))
        .route("/jerseys", post(jerseys::create_jersey))
        .route("/jerseys/:id", get(jerseys::get_jersey))
        .route("/jerseys/:id", put(jerseys::update_jersey))
        .route("/jerseys/:id", delete(jerseys::delete_jersey))
}
