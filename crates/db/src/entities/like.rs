//! Like entity (a user liking a noodle).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "noodle_like")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who liked
    #[sea_orm(indexed)]
    pub user_id: String,

    /// The noodle being liked
    #[sea_orm(indexed)]
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
