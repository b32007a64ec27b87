use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
};
use sea_orm::sea_query::Expr;
use sea_orm::{EntityTrait, ModelTrait, Order, QueryOrder, QuerySelect};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::database::entities::{
    derby_jerseys, derby_jerseys::Entity as DerbyJerseys, derby_names::Entity as DerbyNames,
};
use crate::server::app::AppState;

const INDEX_NAMES: u64 = 10;

pub(crate) fn render(
    state: &AppState,
    template: &str,
    data: &Value,
) -> Result<Html<String>, StatusCode> {
    state.hb.render(template, data).map(Html).map_err(|err| {
        error!("Template render error ({}): {}", template, err);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

fn db_error(err: sea_orm::DbErr) -> StatusCode {
    error!("Database error: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let names = DerbyNames::find()
        .order_by(Expr::cust("RANDOM()"), Order::Asc)
        .limit(INDEX_NAMES)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    info!("Rendering index with {} names", names.len());
    render(&state, "index", &json!({ "names": names }))
}

pub async fn name_detail(
    State(state): State<AppState>,
    Path(name_id): Path<i32>,
) -> Result<Html<String>, StatusCode> {
    let name = DerbyNames::find_by_id(name_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let jersey = name
        .find_related(DerbyJerseys)
        .order_by_asc(derby_jerseys::Column::Id)
        .one(&state.db)
        .await
        .map_err(db_error)?;

    info!("Rendering detail for name: {}", name.name);
    render(&state, "detail", &json!({ "name": name, "jersey": jersey }))
}

pub async fn jersey_grid(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let rows = DerbyJerseys::find()
        .find_also_related(DerbyNames)
        .order_by_asc(derby_jerseys::Column::Id)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let jerseys: Vec<Value> = rows
        .into_iter()
        .map(|(jersey, name)| {
            json!({
                "id": jersey.id,
                "image": jersey.image,
                "name": name.map(|n| n.name).unwrap_or_default(),
                "name_id": jersey.name_id,
            })
        })
        .collect();

    render(&state, "jerseys", &json!({ "jerseys": jerseys }))
}
