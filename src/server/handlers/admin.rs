use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, SqlErr};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::database::entities::{
    derby_jerseys, derby_jerseys::Entity as DerbyJerseys, derby_names,
    derby_names::Entity as DerbyNames,
};
use crate::server::app::AppState;
use crate::server::handlers::{jerseys, pages};

#[derive(Deserialize)]
pub struct CreateNameForm {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateJerseyForm {
    pub name_id: i32,
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

/// The whole management surface on one page: names with delete buttons, a
/// create form, and a jersey form per stored name.
pub async fn console(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let names = DerbyNames::find()
        .order_by_asc(derby_names::Column::Name)
        .all(&state.db)
        .await
        .map_err(db_error)?;

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
                "metadata": jersey.metadata,
                "name": name.map(|n| n.name).unwrap_or_default(),
            })
        })
        .collect();

    pages::render(
        &state,
        "admin",
        &json!({ "names": names, "jerseys": jerseys }),
    )
}

pub async fn create_name(
    State(state): State<AppState>,
    Form(form): Form<CreateNameForm>,
) -> Result<Redirect, StatusCode> {
    let name = form.name.trim().to_string();
    if name.is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let now = Utc::now();
    let row = derby_names::ActiveModel {
        name: Set(name),
        metadata: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    row.insert(&state.db).await.map_err(db_error)?;

    Ok(Redirect::to("/admin"))
}

pub async fn delete_name(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Redirect, StatusCode> {
    let name = DerbyNames::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    DerbyNames::delete_by_id(name.id)
        .exec(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Redirect::to("/admin"))
}

pub async fn create_jersey(
    State(state): State<AppState>,
    Form(form): Form<CreateJerseyForm>,
) -> Result<Redirect, StatusCode> {
    let name = DerbyNames::find_by_id(form.name_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    jerseys::insert_jersey(&state, &name, None, None)
        .await
        .map_err(db_error)?;

    Ok(Redirect::to("/admin"))
}
