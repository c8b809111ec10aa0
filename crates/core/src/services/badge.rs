//! Prefecture badge service.
//!
//! A badge's tier follows the number of distinct shops a user has logged in
//! a prefecture, but only ever moves up. The stored `visit_count` is
//! refreshed on every recalculation and may go down while the tier stays.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use menlog_common::{AppResult, IdGenerator, prefecture_code};
use menlog_db::{
    entities::{
        prefecture_badge::{self, BadgeTier},
        shop,
    },
    repositories::{NoodleRepository, PrefectureBadgeRepository, ShopRepository},
};
use sea_orm::Set;
use serde::Serialize;
use tracing::info;

/// Visit statistics for one prefecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefectureStat {
    pub prefecture: String,
    pub visit_count: u64,
    pub tier: Option<BadgeTier>,
}

/// What a recalculation does to the stored badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradePlan {
    /// No badge and nothing earned.
    Skip,
    /// First badge for this prefecture.
    Insert(BadgeTier),
    /// Existing badge moves to a higher tier.
    Promote(BadgeTier),
    /// Tier unchanged; only the visit count is refreshed.
    Refresh,
}

/// Decide how to reconcile a stored tier with a freshly computed one.
#[must_use]
pub fn plan_upgrade(stored: Option<BadgeTier>, computed: Option<BadgeTier>) -> UpgradePlan {
    match (stored, computed) {
        (None, None) => UpgradePlan::Skip,
        (None, Some(tier)) => UpgradePlan::Insert(tier),
        (Some(old), Some(new)) if new.rank() > old.rank() => UpgradePlan::Promote(new),
        (Some(_), _) => UpgradePlan::Refresh,
    }
}

/// Group shops by prefecture and grade each group.
///
/// Sorted by visit count descending, then JIS prefecture order.
#[must_use]
pub fn tally_prefectures(shops: &[shop::Model]) -> Vec<PrefectureStat> {
    let mut per_prefecture: HashMap<&str, HashSet<&str>> = HashMap::new();
    for shop in shops {
        per_prefecture
            .entry(shop.prefecture.as_str())
            .or_default()
            .insert(shop.id.as_str());
    }

    let mut stats: Vec<PrefectureStat> = per_prefecture
        .into_iter()
        .map(|(prefecture, ids)| {
            let visit_count = ids.len() as u64;
            PrefectureStat {
                prefecture: prefecture.to_string(),
                visit_count,
                tier: BadgeTier::for_visit_count(visit_count),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.visit_count.cmp(&a.visit_count).then_with(|| {
            prefecture_sort_key(&a.prefecture).cmp(&prefecture_sort_key(&b.prefecture))
        })
    });
    stats
}

fn prefecture_sort_key(prefecture: &str) -> (usize, &str) {
    (prefecture_code(prefecture).unwrap_or(usize::MAX), prefecture)
}

/// Prefecture badge service for business logic.
#[derive(Clone)]
pub struct BadgeService {
    badge_repo: PrefectureBadgeRepository,
    noodle_repo: NoodleRepository,
    shop_repo: ShopRepository,
    id_gen: IdGenerator,
}

impl BadgeService {
    /// Create a new badge service.
    #[must_use]
    pub const fn new(
        badge_repo: PrefectureBadgeRepository,
        noodle_repo: NoodleRepository,
        shop_repo: ShopRepository,
    ) -> Self {
        Self {
            badge_repo,
            noodle_repo,
            shop_repo,
            id_gen: IdGenerator::new(),
        }
    }

    async fn visited_shops(&self, user_id: &str) -> AppResult<Vec<shop::Model>> {
        let shop_ids = self
            .noodle_repo
            .find_distinct_shop_ids_by_user(user_id)
            .await?;
        self.shop_repo.find_by_ids(&shop_ids).await
    }

    /// Per-prefecture visit counts with the tier each would earn.
    pub async fn prefecture_stats(&self, user_id: &str) -> AppResult<Vec<PrefectureStat>> {
        let shops = self.visited_shops(user_id).await?;
        Ok(tally_prefectures(&shops))
    }

    /// Recalculate one prefecture's badge from scratch.
    ///
    /// Returns `None` when the user never visited the prefecture and holds no badge.
    pub async fn upgrade(
        &self,
        user_id: &str,
        prefecture: &str,
    ) -> AppResult<Option<prefecture_badge::Model>> {
        let visit_count = self
            .visited_shops(user_id)
            .await?
            .iter()
            .filter(|s| s.prefecture == prefecture)
            .count() as u64;

        let existing = self
            .badge_repo
            .find_by_user_and_prefecture(user_id, prefecture)
            .await?;

        self.apply(user_id, prefecture, visit_count, existing).await
    }

    async fn apply(
        &self,
        user_id: &str,
        prefecture: &str,
        visit_count: u64,
        existing: Option<prefecture_badge::Model>,
    ) -> AppResult<Option<prefecture_badge::Model>> {
        let computed = BadgeTier::for_visit_count(visit_count);
        let now = Utc::now();
        let count = i32::try_from(visit_count).unwrap_or(i32::MAX);

        match (plan_upgrade(existing.as_ref().map(|b| b.tier), computed), existing) {
            (UpgradePlan::Skip, _) => Ok(None),
            (UpgradePlan::Insert(tier), _) => {
                info!(user_id = %user_id, prefecture = %prefecture, ?tier, "Badge earned");
                let model = prefecture_badge::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    prefecture: Set(prefecture.to_string()),
                    tier: Set(tier),
                    visit_count: Set(count),
                    earned_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                self.badge_repo.create(model).await.map(Some)
            }
            (UpgradePlan::Promote(tier), Some(badge)) => {
                info!(user_id = %user_id, prefecture = %prefecture, ?tier, "Badge promoted");
                let mut active: prefecture_badge::ActiveModel = badge.into();
                active.tier = Set(tier);
                active.earned_at = Set(now.into());
                active.visit_count = Set(count);
                active.updated_at = Set(now.into());
                self.badge_repo.update(active).await.map(Some)
            }
            (_, Some(badge)) => {
                let mut active: prefecture_badge::ActiveModel = badge.into();
                active.visit_count = Set(count);
                active.updated_at = Set(now.into());
                self.badge_repo.update(active).await.map(Some)
            }
            (_, None) => Ok(None),
        }
    }

    /// Recalculate every prefecture the user has visited or holds a badge for.
    pub async fn recalculate_all(&self, user_id: &str) -> AppResult<Vec<prefecture_badge::Model>> {
        let stats = self.prefecture_stats(user_id).await?;
        let mut existing: HashMap<String, prefecture_badge::Model> = self
            .badge_repo
            .find_by_user(user_id)
            .await?
            .into_iter()
            .map(|b| (b.prefecture.clone(), b))
            .collect();

        let mut badges = Vec::new();
        for stat in &stats {
            let held = existing.remove(&stat.prefecture);
            if let Some(badge) = self
                .apply(user_id, &stat.prefecture, stat.visit_count, held)
                .await?
            {
                badges.push(badge);
            }
        }

        // Badges for prefectures with no remaining visits keep their tier
        for (prefecture, held) in existing {
            if let Some(badge) = self.apply(user_id, &prefecture, 0, Some(held)).await? {
                badges.push(badge);
            }
        }

        sort_badges(&mut badges);
        Ok(badges)
    }

    /// Stored badges, highest tier first.
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<prefecture_badge::Model>> {
        let mut badges = self.badge_repo.find_by_user(user_id).await?;
        sort_badges(&mut badges);
        Ok(badges)
    }

    /// Rank of the highest tier held, 0 without badges.
    pub async fn highest_rank(&self, user_id: &str) -> AppResult<i16> {
        Ok(self
            .badge_repo
            .find_by_user(user_id)
            .await?
            .iter()
            .map(|b| b.tier.rank())
            .max()
            .unwrap_or(0))
    }
}

fn sort_badges(badges: &mut [prefecture_badge::Model]) {
    badges.sort_by(|a, b| {
        b.tier.rank().cmp(&a.tier.rank()).then_with(|| {
            prefecture_sort_key(&a.prefecture).cmp(&prefecture_sort_key(&b.prefecture))
        })
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn shop(id: &str, prefecture: &str) -> shop::Model {
        shop::Model {
            id: id.to_string(),
            name: format!("Shop {id}"),
            address: format!("{prefecture}どこか1-1"),
            url: None,
            prefecture: prefecture.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn badge(prefecture: &str, tier: BadgeTier, visit_count: i32) -> prefecture_badge::Model {
        prefecture_badge::Model {
            id: format!("b-{prefecture}"),
            user_id: "user1".to_string(),
            prefecture: prefecture.to_string(),
            tier,
            visit_count,
            earned_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_plan_upgrade() {
        assert_eq!(plan_upgrade(None, None), UpgradePlan::Skip);
        assert_eq!(
            plan_upgrade(None, Some(BadgeTier::Bronze)),
            UpgradePlan::Insert(BadgeTier::Bronze)
        );
        assert_eq!(
            plan_upgrade(Some(BadgeTier::Bronze), Some(BadgeTier::Silver)),
            UpgradePlan::Promote(BadgeTier::Silver)
        );
        assert_eq!(
            plan_upgrade(Some(BadgeTier::Silver), Some(BadgeTier::Silver)),
            UpgradePlan::Refresh
        );
    }

    #[test]
    fn test_plan_upgrade_never_demotes() {
        assert_eq!(
            plan_upgrade(Some(BadgeTier::Gold), Some(BadgeTier::Bronze)),
            UpgradePlan::Refresh
        );
        assert_eq!(plan_upgrade(Some(BadgeTier::Gold), None), UpgradePlan::Refresh);
    }

    #[test]
    fn test_tally_prefectures() {
        let mut shops: Vec<shop::Model> = (0..5).map(|i| shop(&format!("t{i}"), "東京都")).collect();
        shops.push(shop("o1", "大阪府"));
        shops.push(shop("h1", "北海道"));

        let stats = tally_prefectures(&shops);

        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].prefecture, "東京都");
        assert_eq!(stats[0].visit_count, 5);
        assert_eq!(stats[0].tier, Some(BadgeTier::Silver));
        // Ties fall back to JIS order: 北海道 (1) before 大阪府 (27)
        assert_eq!(stats[1].prefecture, "北海道");
        assert_eq!(stats[2].prefecture, "大阪府");
        assert_eq!(stats[2].tier, Some(BadgeTier::Bronze));
    }

    #[tokio::test]
    async fn test_upgrade_keeps_gold_with_fewer_visits() {
        let noodle_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![shop_id_row("s1")]])
                .into_connection(),
        );
        let shop_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[shop("s1", "東京都")]])
                .into_connection(),
        );
        let refreshed = badge("東京都", BadgeTier::Gold, 1);
        let badge_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[badge("東京都", BadgeTier::Gold, 12)]])
                .append_query_results([[refreshed.clone()]])
                .into_connection(),
        );

        let service = BadgeService::new(
            PrefectureBadgeRepository::new(badge_db),
            NoodleRepository::new(noodle_db),
            ShopRepository::new(shop_db),
        );

        let result = service.upgrade("user1", "東京都").await.unwrap().unwrap();

        assert_eq!(result.tier, BadgeTier::Gold);
        assert_eq!(result.visit_count, 1);
    }

    #[tokio::test]
    async fn test_upgrade_promotes_bronze_to_silver() {
        let shop_ids = ["s1", "s2", "s3", "s4", "s5"];
        let noodle_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([shop_ids.iter().map(|id| shop_id_row(id)).collect::<Vec<_>>()])
                .into_connection(),
        );
        let shop_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([shop_ids
                    .iter()
                    .map(|id| shop(id, "東京都"))
                    .collect::<Vec<_>>()])
                .into_connection(),
        );
        let badge_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[badge("東京都", BadgeTier::Bronze, 4)]])
                .append_query_results([[badge("東京都", BadgeTier::Silver, 5)]])
                .into_connection(),
        );

        let service = BadgeService::new(
            PrefectureBadgeRepository::new(Arc::clone(&badge_db)),
            NoodleRepository::new(noodle_db),
            ShopRepository::new(shop_db),
        );

        let result = service.upgrade("user1", "東京都").await.unwrap().unwrap();
        drop(service);

        assert_eq!(result.tier, BadgeTier::Silver);
        assert_eq!(result.visit_count, 5);

        let log = Arc::try_unwrap(badge_db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 2);
        let update = format!("{:?}", log[1]);
        assert!(update.contains("UPDATE"));
        assert!(update.contains("silver"));
    }

    #[tokio::test]
    async fn test_upgrade_without_visits_or_badge() {
        let noodle_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<BTreeMap<String, Value>>::new()])
                .into_connection(),
        );
        let shop_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let badge_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<prefecture_badge::Model>::new()])
                .into_connection(),
        );

        let service = BadgeService::new(
            PrefectureBadgeRepository::new(badge_db),
            NoodleRepository::new(noodle_db),
            ShopRepository::new(shop_db),
        );

        let result = service.upgrade("user1", "沖縄県").await.unwrap();

        assert!(result.is_none());
    }

    /// A single-column row as returned by a `SELECT DISTINCT shop_id` query.
    fn shop_id_row(shop_id: &str) -> BTreeMap<String, Value> {
        BTreeMap::from([("shop_id".to_string(), Value::from(shop_id.to_string()))])
    }
}
