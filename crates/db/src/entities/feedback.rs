//! Feedback entity (app-improvement suggestions).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Feedback categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum FeedbackCategory {
    #[sea_orm(string_value = "feature")]
    Feature,
    #[sea_orm(string_value = "bug")]
    Bug,
    #[sea_orm(string_value = "ui")]
    Ui,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feedback")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    pub category: FeedbackCategory,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Author's own heat level, 1-3
    pub heat_level: i16,

    /// Sum of the heat levels of all steam reactions
    #[sea_orm(default_value = 0)]
    pub steam_count: i32,

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

    #[sea_orm(has_many = "super::feedback_steam::Entity")]
    Steams,
}

impl Related<super::feedback_steam::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Steams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
