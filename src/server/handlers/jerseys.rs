use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::database::entities::{
    derby_jerseys, derby_jerseys::Entity as DerbyJerseys, derby_names,
    derby_names::Entity as DerbyNames,
};
use crate::server::app::AppState;
use crate::services::generation_attempted;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateJerseyRequest {
    pub name_id: i32,
    pub image: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UpdateJerseyRequest {
    pub image: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

fn db_error(err: DbErr) -> StatusCode {
    error!("Database error: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR
}

#[utoipa::path(
    get,
    path = "/api/v1/jerseys",
    tag = "jerseys",
    responses(
        (status = 200, description = "List all jerseys", body = [crate::database::entities::derby_jerseys::Model])
    )
)]
pub async fn list_jerseys(
    State(state): State<AppState>,
) -> Result<Json<Vec<derby_jerseys::Model>>, StatusCode> {
    let jerseys = DerbyJerseys::find()
        .order_by_asc(derby_jerseys::Column::Id)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(jerseys))
}

#[utoipa::path(
    post,
    path = "/api/v1/jerseys",
    tag = "jerseys",
    request_body = crate::server::handlers::jerseys::CreateJerseyRequest,
    responses(
        (status = 200, description = "Jersey created; image generation may run in the background", body = crate::database::entities::derby_jerseys::Model),
        (status = 404, description = "Referenced name not found")
    )
)]
pub async fn create_jersey(
    State(state): State<AppState>,
    Json(payload): Json<CreateJerseyRequest>,
) -> Result<Json<derby_jerseys::Model>, StatusCode> {
    let name = DerbyNames::find_by_id(payload.name_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let jersey = insert_jersey(&state, &name, payload.image, payload.metadata)
        .await
        .map_err(db_error)?;

    Ok(Json(jersey))
}

#[utoipa::path(
    get,
    path = "/api/v1/jerseys/{id}",
    tag = "jerseys",
    params(
        ("id" = i32, Path, description = "Jersey ID")
    ),
    responses(
        (status = 200, description = "Jersey found", body = crate::database::entities::derby_jerseys::Model),
        (status = 404, description = "Jersey not found")
    )
)]
pub async fn get_jersey(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<derby_jerseys::Model>, StatusCode> {
    let jersey = DerbyJerseys::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(jersey))
}

#[utoipa::path(
    put,
    path = "/api/v1/jerseys/{id}",
    tag = "jerseys",
    params(
        ("id" = i32, Path, description = "Jersey ID")
    ),
    request_body = crate::server::handlers::jerseys::UpdateJerseyRequest,
    responses(
        (status = 200, description = "Jersey updated; clearing the attempted flag re-arms generation", body = crate::database::entities::derby_jerseys::Model),
        (status = 404, description = "Jersey not found")
    )
)]
pub async fn update_jersey(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateJerseyRequest>,
) -> Result<Json<derby_jerseys::Model>, StatusCode> {
    let jersey = DerbyJerseys::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let mut jersey: derby_jerseys::ActiveModel = jersey.into();
    jersey.image = Set(payload.image);
    jersey.metadata = Set(payload.metadata);
    jersey.updated_at = Set(Utc::now());

    let jersey = jersey.update(&state.db).await.map_err(db_error)?;

    maybe_spawn_generation(&state, &jersey).await.map_err(db_error)?;

    Ok(Json(jersey))
}

#[utoipa::path(
    delete,
    path = "/api/v1/jerseys/{id}",
    tag = "jerseys",
    params(
        ("id" = i32, Path, description = "Jersey ID")
    ),
    responses(
        (status = 204, description = "Jersey deleted"),
        (status = 404, description = "Jersey not found")
    )
)]
pub async fn delete_jersey(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, StatusCode> {
    let jersey = DerbyJerseys::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    DerbyJerseys::delete_by_id(jersey.id)
        .exec(&state.db)
        .await
        .map_err(db_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Insert a jersey row and kick off image generation when it applies.
/// Shared by the REST handler and the admin console form.
pub(crate) async fn insert_jersey(
    state: &AppState,
    name: &derby_names::Model,
    image: Option<String>,
    metadata: Option<serde_json::Value>,
) -> Result<derby_jerseys::Model, DbErr> {
    let now = Utc::now();
    let jersey = derby_jerseys::ActiveModel {
        name_id: Set(name.id),
        image: Set(image),
        metadata: Set(metadata),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let jersey = jersey.insert(&state.db).await?;

    if jersey.image.is_none() && !generation_attempted(&jersey.metadata) {
        if let Some(images) = &state.images {
            info!(
                "No jersey image found for {}. Generating one in the background",
                name.name
            );
            images.spawn_generation(jersey.clone(), name.name.clone());
        }
    }

    Ok(jersey)
}

/// Re-dispatch generation after an update when the jersey still has no image
/// and the attempted flag is absent or was cleared.
async fn maybe_spawn_generation(
    state: &AppState,
    jersey: &derby_jerseys::Model,
) -> Result<(), DbErr> {
    let Some(images) = &state.images else {
        return Ok(());
    };
    if jersey.image.is_some() || generation_attempted(&jersey.metadata) {
        return Ok(());
    }
    let Some(name) = DerbyNames::find_by_id(jersey.name_id).one(&state.db).await? else {
        return Ok(());
    };

    info!(
        "No jersey image found for {}. Generating one in the background",
        name.name
    );
    images.spawn_generation(jersey.clone(), name.name);
    Ok(())
}
