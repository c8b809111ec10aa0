//! Shop entity (a ramen shop).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shop")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub address: String,

    /// Listing page the shop was imported from
    #[sea_orm(nullable)]
    pub url: Option<String>,

    /// One of the 47 prefectures
    #[sea_orm(indexed)]
    pub prefecture: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::noodle::Entity")]
    Noodles,
}

impl Related<super::noodle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Noodles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
