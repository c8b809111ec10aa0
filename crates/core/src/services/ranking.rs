//! Rankings over noodles and likes.
//!
//! Rows in the requested period are fetched, grouped and counted in memory.
//! The counting and ranking steps are plain functions over model slices.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::services::user::UserSummary;
use chrono::{DateTime, Duration, Utc};
use menlog_common::{AppError, AppResult};
use menlog_db::{
    entities::{like, noodle},
    repositories::{LikeRepository, NoodleRepository, UserRepository},
};
use serde::{Deserialize, Serialize};

/// Default number of ranked entries.
pub const DEFAULT_RANKING_LIMIT: u64 = 50;
/// Largest number of ranked entries a client may request.
pub const MAX_RANKING_LIMIT: u64 = 100;

/// Time window a ranking covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingPeriod {
    #[default]
    All,
    Week,
    Month,
}

impl RankingPeriod {
    /// Earliest creation time included, `None` for all time.
    #[must_use]
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::Week => Some(now - Duration::days(7)),
            Self::Month => Some(now - Duration::days(30)),
        }
    }
}

impl FromStr for RankingPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(AppError::BadRequest(format!("Unknown period: {other}"))),
        }
    }
}

/// What is being ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingView {
    /// Distinct shops visited per user.
    Shops,
    /// Noodles posted per user.
    Posts,
    /// Likes received per noodle.
    NoodleLikes,
    /// Likes received per author.
    UserLikes,
}

impl FromStr for RankingView {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shops" => Ok(Self::Shops),
            "posts" => Ok(Self::Posts),
            "noodle-likes" => Ok(Self::NoodleLikes),
            "user-likes" => Ok(Self::UserLikes),
            other => Err(AppError::NotFound(format!("Ranking: {other}"))),
        }
    }
}

/// One ranked key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    pub rank: usize,
    pub key: String,
    pub count: u64,
}

/// Distinct shops per user.
#[must_use]
pub fn count_distinct_shops(noodles: &[noodle::Model]) -> HashMap<String, u64> {
    let mut shops: HashMap<&str, HashSet<&str>> = HashMap::new();
    for n in noodles {
        shops.entry(&n.user_id).or_default().insert(&n.shop_id);
    }
    shops
        .into_iter()
        .map(|(user, set)| (user.to_string(), set.len() as u64))
        .collect()
}

/// Noodles per user.
#[must_use]
pub fn count_posts(noodles: &[noodle::Model]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for n in noodles {
        *counts.entry(n.user_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// Likes per noodle.
#[must_use]
pub fn count_likes_per_noodle(likes: &[like::Model]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for l in likes {
        *counts.entry(l.noodle_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// Likes per noodle author. Likes on unknown noodles are skipped.
#[must_use]
pub fn count_likes_per_author(
    likes: &[like::Model],
    authors: &HashMap<String, String>,
) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for l in likes {
        if let Some(author) = authors.get(&l.noodle_id) {
            *counts.entry(author.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Sort counts descending (ties by key ascending), drop keys `keep` rejects,
/// truncate to `limit` and number the result from 1.
#[must_use]
pub fn rank_counts(
    counts: HashMap<String, u64>,
    keep: impl Fn(&str) -> bool,
    limit: usize,
) -> Vec<Ranked> {
    let mut entries: Vec<(String, u64)> = counts
        .into_iter()
        .filter(|(key, count)| *count > 0 && keep(key))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(limit);

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (key, count))| Ranked {
            rank: i + 1,
            key,
            count,
        })
        .collect()
}

/// A ranked user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRankingEntry {
    pub rank: usize,
    pub user: UserSummary,
    pub count: u64,
}

/// A ranked noodle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoodleRankingEntry {
    pub rank: usize,
    pub noodle: noodle::Model,
    pub user: UserSummary,
    pub count: u64,
}

/// Ranking result for any view.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RankingEntries {
    Users(Vec<UserRankingEntry>),
    Noodles(Vec<NoodleRankingEntry>),
}

impl RankingEntries {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Users(v) => v.len(),
            Self::Noodles(v) => v.len(),
        }
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ranking service.
#[derive(Clone)]
pub struct RankingService {
    noodle_repo: NoodleRepository,
    like_repo: LikeRepository,
    user_repo: UserRepository,
}

impl RankingService {
    /// Create a new ranking service.
    #[must_use]
    pub const fn new(
        noodle_repo: NoodleRepository,
        like_repo: LikeRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            noodle_repo,
            like_repo,
            user_repo,
        }
    }

    /// Active users among `ids`, summarised.
    async fn active_users(&self, ids: Vec<String>) -> AppResult<HashMap<String, UserSummary>> {
        Ok(self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .iter()
            .filter(|u| !u.is_deleted())
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect())
    }

    async fn rank_users(
        &self,
        counts: HashMap<String, u64>,
        limit: usize,
    ) -> AppResult<RankingEntries> {
        let users = self.active_users(counts.keys().cloned().collect()).await?;
        let ranked = rank_counts(counts, |id| users.contains_key(id), limit);

        Ok(RankingEntries::Users(
            ranked
                .into_iter()
                .filter_map(|r| {
                    Some(UserRankingEntry {
                        rank: r.rank,
                        user: users.get(&r.key)?.clone(),
                        count: r.count,
                    })
                })
                .collect(),
        ))
    }

    /// Compute a ranking.
    pub async fn ranking(
        &self,
        view: RankingView,
        period: RankingPeriod,
        limit: Option<u64>,
    ) -> AppResult<RankingEntries> {
        let limit = usize::try_from(
            limit
                .unwrap_or(DEFAULT_RANKING_LIMIT)
                .clamp(1, MAX_RANKING_LIMIT),
        )
        .unwrap_or(DEFAULT_RANKING_LIMIT as usize);
        let since = period.since(Utc::now()).map(Into::into);

        match view {
            RankingView::Shops => {
                let noodles = self.noodle_repo.find_created_since(since).await?;
                self.rank_users(count_distinct_shops(&noodles), limit).await
            }
            RankingView::Posts => {
                let noodles = self.noodle_repo.find_created_since(since).await?;
                self.rank_users(count_posts(&noodles), limit).await
            }
            RankingView::UserLikes => {
                let likes = self.like_repo.find_created_since(since).await?;
                let noodle_ids = unique_noodle_ids(&likes);
                let authors: HashMap<String, String> = self
                    .noodle_repo
                    .find_by_ids(&noodle_ids)
                    .await?
                    .into_iter()
                    .map(|n| (n.id, n.user_id))
                    .collect();
                self.rank_users(count_likes_per_author(&likes, &authors), limit)
                    .await
            }
            RankingView::NoodleLikes => {
                let likes = self.like_repo.find_created_since(since).await?;
                let noodle_ids = unique_noodle_ids(&likes);
                let noodles: HashMap<String, noodle::Model> = self
                    .noodle_repo
                    .find_by_ids(&noodle_ids)
                    .await?
                    .into_iter()
                    .map(|n| (n.id.clone(), n))
                    .collect();
                let users = self
                    .active_users(noodles.values().map(|n| n.user_id.clone()).collect())
                    .await?;

                let ranked = rank_counts(
                    count_likes_per_noodle(&likes),
                    |id| {
                        noodles
                            .get(id)
                            .is_some_and(|n| users.contains_key(&n.user_id))
                    },
                    limit,
                );

                Ok(RankingEntries::Noodles(
                    ranked
                        .into_iter()
                        .filter_map(|r| {
                            let noodle = noodles.get(&r.key)?.clone();
                            let user = users.get(&noodle.user_id)?.clone();
                            Some(NoodleRankingEntry {
                                rank: r.rank,
                                noodle,
                                user,
                                count: r.count,
                            })
                        })
                        .collect(),
                ))
            }
        }
    }
}

fn unique_noodle_ids(likes: &[like::Model]) -> Vec<String> {
    likes
        .iter()
        .map(|l| l.noodle_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect()
}
