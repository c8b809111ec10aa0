//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod badge;
pub mod comment;
pub mod comment_like;
pub mod feedback;
pub mod image;
pub mod like;
pub mod my_best;
pub mod noodle;
pub mod notification;
pub mod ranking;
pub mod shop;
pub mod station;
pub mod toggle;
pub mod user;

pub use auth::{IdentityClaims, TokenVerifier};
pub use badge::{BadgeService, PrefectureStat, UpgradePlan, plan_upgrade, tally_prefectures};
pub use comment::{CommentService, CommentView};
pub use comment_like::{CommentLikeService, CommentLikeToggleResult};
pub use feedback::{CreateFeedbackInput, FeedbackService, SteamResult};
pub use image::ImageService;
pub use like::{LikeService, LikeToggleResult};
pub use my_best::MyBestService;
pub use noodle::{CreateNoodleInput, NoodleService, NoodleView, UpdateNoodleInput};
pub use notification::NotificationService;
pub use ranking::{
    NoodleRankingEntry, RankingEntries, RankingPeriod, RankingService, RankingView,
    UserRankingEntry,
};
pub use shop::{CreateShopInput, ShopService};
pub use station::StationService;
pub use toggle::{ToggleOutcome, resolve_toggle};
pub use user::{UpdateProfileInput, UserService, UserSummary};
