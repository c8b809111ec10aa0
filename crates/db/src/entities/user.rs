//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Stable subject id issued by the identity provider
    #[sea_orm(unique)]
    pub external_auth_id: String,

    /// Display name
    pub name: String,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// Avatar URL
    #[sea_orm(nullable)]
    pub image: Option<String>,

    /// Unlocked theme the user picked (0 = default)
    #[sea_orm(default_value = 0)]
    pub selected_theme_level: i16,

    /// Soft delete marker. Deleted users are hidden everywhere.
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether the user has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::noodle::Entity")]
    Noodles,

    #[sea_orm(has_many = "super::prefecture_badge::Entity")]
    PrefectureBadges,
}

impl Related<super::noodle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Noodles.def()
    }
}

impl Related<super::prefecture_badge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrefectureBadges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
