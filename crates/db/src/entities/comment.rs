//! Comment entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub noodle_id: String,

    pub user_id: String,

    /// Trimmed, 1-500 characters
    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Comment likes count (denormalized)
    #[sea_orm(default_value = 0)]
    pub like_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::noodle::Entity",
        from = "Column::NoodleId",
        to = "super::noodle::Column::Id",
        on_delete = "Cascade"
    )]
    Noodle,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::noodle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Noodle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
