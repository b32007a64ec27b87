use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A jersey design for one derby name. `image` is a path relative to the
/// media root; the metadata JSON carries the generation bookkeeping
/// (`generation_attempted`, `prompt`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = DerbyJersey)]
#[sea_orm(table_name = "derby_jerseys")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name_id: i32,
    pub image: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Json>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::derby_names::Entity",
        from = "Column::NameId",
        to = "super::derby_names::Column::Id",
        on_delete = "Cascade"
    )]
    DerbyName,
}

impl Related<super::derby_names::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DerbyName.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
