use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, EntityTrait, Order, QueryFilter, QueryOrder, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::database::entities::{derby_names, derby_names::Entity as DerbyNames};
use crate::server::app::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateNameRequest {
    pub name: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UpdateNameRequest {
    pub name: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

fn db_error(err: sea_orm::DbErr) -> StatusCode {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StatusCode::CONFLICT,
        _ => {
            error!("Database error: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/names",
    tag = "names",
    responses(
        (status = 200, description = "List all derby names", body = [crate::database::entities::derby_names::Model])
    )
)]
pub async fn list_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<derby_names::Model>>, StatusCode> {
    let names = DerbyNames::find()
        .order_by_asc(derby_names::Column::Name)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(names))
}

#[utoipa::path(
    post,
    path = "/api/v1/names",
    tag = "names",
    request_body = crate::server::handlers::names::CreateNameRequest,
    responses(
        (status = 200, description = "Name created successfully", body = crate::database::entities::derby_names::Model),
        (status = 409, description = "Name already exists")
    )
)]
pub async fn create_name(
    State(state): State<AppState>,
    Json(payload): Json<CreateNameRequest>,
) -> Result<Json<derby_names::Model>, StatusCode> {
    let now = Utc::now();
    let name = derby_names::ActiveModel {
        name: Set(payload.name),
        metadata: Set(payload.metadata),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let name = name.insert(&state.db).await.map_err(db_error)?;

    Ok(Json(name))
}

#[utoipa::path(
    get,
    path = "/api/v1/names/{id}",
    tag = "names",
    params(
        ("id" = i32, Path, description = "Name ID")
    ),
    responses(
        (status = 200, description = "Name found", body = crate::database::entities::derby_names::Model),
        (status = 404, description = "Name not found")
    )
)]
pub async fn get_name(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<derby_names::Model>, StatusCode> {
    let name = DerbyNames::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(name))
}

#[utoipa::path(
    put,
    path = "/api/v1/names/{id}",
    tag = "names",
    params(
        ("id" = i32, Path, description = "Name ID")
    ),
    request_body = crate::server::handlers::names::UpdateNameRequest,
    responses(
        (status = 200, description = "Name updated successfully", body = crate::database::entities::derby_names::Model),
        (status = 404, description = "Name not found"),
        (status = 409, description = "Name already exists")
    )
)]
pub async fn update_name(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateNameRequest>,
) -> Result<Json<derby_names::Model>, StatusCode> {
    let name = DerbyNames::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let mut name: derby_names::ActiveModel = name.into();
    name.name = Set(payload.name);
    name.metadata = Set(payload.metadata);
    name.updated_at = Set(Utc::now());

    let name = name.update(&state.db).await.map_err(db_error)?;

    Ok(Json(name))
}

#[utoipa::path(
    delete,
    path = "/api/v1/names/{id}",
    tag = "names",
    params(
        ("id" = i32, Path, description = "Name ID")
    ),
    responses(
        (status = 204, description = "Name and its jerseys deleted"),
        (status = 404, description = "Name not found")
    )
)]
pub async fn delete_name(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, StatusCode> {
    let name = DerbyNames::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    DerbyNames::delete_by_id(name.id)
        .exec(&state.db)
        .await
        .map_err(db_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/names/random",
    tag = "names",
    responses(
        (status = 200, description = "One uniformly random name", body = crate::database::entities::derby_names::Model),
        (status = 404, description = "No names stored")
    )
)]
pub async fn random_name(
    State(state): State<AppState>,
) -> Result<Json<derby_names::Model>, StatusCode> {
    let name = DerbyNames::find()
        .order_by(Expr::cust("RANDOM()"), Order::Asc)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(name))
}

#[utoipa::path(
    get,
    path = "/api/v1/names/starts-with/{prefix}",
    tag = "names",
    params(
        ("prefix" = String, Path, description = "Case-insensitive name prefix")
    ),
    responses(
        (status = 200, description = "Names starting with the prefix", body = [crate::database::entities::derby_names::Model])
    )
)]
pub async fn names_starting_with(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Result<Json<Vec<derby_names::Model>>, StatusCode> {
    search_names(&state, &prefix, MatchKind::Prefix).await
}

#[utoipa::path(
    get,
    path = "/api/v1/names/contains/{substring}",
    tag = "names",
    params(
        ("substring" = String, Path, description = "Case-insensitive name substring")
    ),
    responses(
        (status = 200, description = "Names containing the substring", body = [crate::database::entities::derby_names::Model])
    )
)]
pub async fn names_containing(
    State(state): State<AppState>,
    Path(substring): Path<String>,
) -> Result<Json<Vec<derby_names::Model>>, StatusCode> {
    search_names(&state, &substring, MatchKind::Substring).await
}

enum MatchKind {
    Prefix,
    Substring,
}

async fn search_names(
    state: &AppState,
    query: &str,
    kind: MatchKind,
) -> Result<Json<Vec<derby_names::Model>>, StatusCode> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let pattern = match kind {
        MatchKind::Prefix => format!("{}%", escape_like(&query)),
        MatchKind::Substring => format!("%{}%", escape_like(&query)),
    };

    let names = DerbyNames::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(derby_names::Column::Name)))
                .like(LikeExpr::new(pattern).escape('\\')),
        )
        .order_by_asc(derby_names::Column::Name)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(names))
}

/// Escape LIKE wildcards in user input so they match literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
