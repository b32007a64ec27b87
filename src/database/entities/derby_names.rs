use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A participant's registered display name. Names are unique at the store
/// level; jerseys hang off a name and go away with it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = DerbyName)]
#[sea_orm(table_name = "derby_names")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Json>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::derby_jerseys::Entity")]
    DerbyJerseys,
}

impl Related<super::derby_jerseys::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DerbyJerseys.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
