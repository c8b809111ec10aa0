//! Prefecture badge entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Badge tiers, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum BadgeTier {
    #[sea_orm(string_value = "bronze")]
    Bronze,
    #[sea_orm(string_value = "silver")]
    Silver,
    #[sea_orm(string_value = "gold")]
    Gold,
}

impl BadgeTier {
    /// Tier earned for a number of distinct shops visited in one prefecture.
    #[must_use]
    pub const fn for_visit_count(count: u64) -> Option<Self> {
        match count {
            0 => None,
            1..=4 => Some(Self::Bronze),
            5..=9 => Some(Self::Silver),
            _ => Some(Self::Gold),
        }
    }

    /// Ordering rank: bronze 1, silver 2, gold 3.
    #[must_use]
    pub const fn rank(self) -> i16 {
        match self {
            Self::Bronze => 1,
            Self::Silver => 2,
            Self::Gold => 3,
        }
    }
}

/// A user's badge for one prefecture.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prefecture_badge")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    pub prefecture: String,

    /// Only ever upgraded
    pub tier: BadgeTier,

    /// Distinct shops visited at last recalculation (advisory)
    pub visit_count: i32,

    /// When the current tier was reached
    pub earned_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
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
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(BadgeTier::for_visit_count(0), None);
        assert_eq!(BadgeTier::for_visit_count(1), Some(BadgeTier::Bronze));
        assert_eq!(BadgeTier::for_visit_count(4), Some(BadgeTier::Bronze));
        assert_eq!(BadgeTier::for_visit_count(5), Some(BadgeTier::Silver));
        assert_eq!(BadgeTier::for_visit_count(9), Some(BadgeTier::Silver));
        assert_eq!(BadgeTier::for_visit_count(10), Some(BadgeTier::Gold));
        assert_eq!(BadgeTier::for_visit_count(250), Some(BadgeTier::Gold));
    }

    #[test]
    fn test_rank_order() {
        assert!(BadgeTier::Gold.rank() > BadgeTier::Silver.rank());
        assert!(BadgeTier::Silver.rank() > BadgeTier::Bronze.rank());
        assert_eq!(BadgeTier::Bronze.rank(), 1);
    }
}
