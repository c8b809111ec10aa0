//! Repositories, one per table.

pub mod comment;
pub mod comment_like;
pub mod feedback;
pub mod feedback_steam;
pub mod image;
pub mod like;
pub mod my_best;
pub mod noodle;
pub mod notification;
pub mod prefecture_badge;
pub mod shop;
pub mod station;
pub mod user;

pub use comment::CommentRepository;
pub use comment_like::CommentLikeRepository;
pub use feedback::{FeedbackRepository, FeedbackSort};
pub use feedback_steam::FeedbackSteamRepository;
pub use image::ImageRepository;
pub use like::LikeRepository;
pub use my_best::MyBestRepository;
pub use noodle::NoodleRepository;
pub use notification::NotificationRepository;
pub use prefecture_badge::PrefectureBadgeRepository;
pub use shop::ShopRepository;
pub use station::StationRepository;
pub use user::UserRepository;
