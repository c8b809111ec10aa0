//! My-best entity: a user's pick of their best noodle per category.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "my_best")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    /// Free-form category such as "shoyu" or "tsukemen"
    pub category: String,

    pub noodle_id: String,

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

impl Related<super::noodle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Noodle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
