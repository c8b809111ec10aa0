//! Database entities.

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

pub use comment::Entity as Comment;
pub use comment_like::Entity as CommentLike;
pub use feedback::Entity as Feedback;
pub use feedback_steam::Entity as FeedbackSteam;
pub use image::Entity as Image;
pub use like::Entity as Like;
pub use my_best::Entity as MyBest;
pub use noodle::Entity as Noodle;
pub use notification::Entity as Notification;
pub use prefecture_badge::Entity as PrefectureBadge;
pub use shop::Entity as Shop;
pub use station::Entity as Station;
pub use user::Entity as User;
