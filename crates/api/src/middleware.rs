//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use menlog_common::{Config, ShopInfoCache, StorageBackend, config::ShopInfoSettings};
use menlog_core::{
    BadgeService, CommentLikeService, CommentService, FeedbackService, ImageService, LikeService,
    MyBestService, NoodleService, NotificationService, RankingService, ShopService,
    StationService, TokenVerifier, UserService,
};
use menlog_db::repositories::{
    CommentLikeRepository, CommentRepository, FeedbackRepository, FeedbackSteamRepository,
    ImageRepository, LikeRepository, MyBestRepository, NoodleRepository, NotificationRepository,
    PrefectureBadgeRepository, ShopRepository, StationRepository, UserRepository,
};
use sea_orm::DatabaseConnection;
use tracing::debug;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub shop_service: ShopService,
    pub noodle_service: NoodleService,
    pub like_service: LikeService,
    pub comment_service: CommentService,
    pub comment_like_service: CommentLikeService,
    pub notification_service: NotificationService,
    pub badge_service: BadgeService,
    pub ranking_service: RankingService,
    pub my_best_service: MyBestService,
    pub feedback_service: FeedbackService,
    pub station_service: StationService,
    pub image_service: ImageService,
    pub token_verifier: TokenVerifier,
    pub shop_info_cache: Option<ShopInfoCache>,
    pub shop_info_settings: ShopInfoSettings,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &Config,
        storage: Arc<dyn StorageBackend>,
        shop_info_cache: Option<ShopInfoCache>,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let shop_repo = ShopRepository::new(Arc::clone(&db));
        let noodle_repo = NoodleRepository::new(Arc::clone(&db));
        let image_repo = ImageRepository::new(Arc::clone(&db));
        let like_repo = LikeRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let comment_like_repo = CommentLikeRepository::new(Arc::clone(&db));
        let notification_repo = NotificationRepository::new(Arc::clone(&db));
        let badge_repo = PrefectureBadgeRepository::new(Arc::clone(&db));
        let my_best_repo = MyBestRepository::new(Arc::clone(&db));
        let feedback_repo = FeedbackRepository::new(Arc::clone(&db));
        let steam_repo = FeedbackSteamRepository::new(Arc::clone(&db));
        let station_repo = StationRepository::new(db);

        let notification_service = NotificationService::new(notification_repo);
        let badge_service =
            BadgeService::new(badge_repo, noodle_repo.clone(), shop_repo.clone());

        Self {
            user_service: UserService::new(user_repo.clone(), badge_service.clone()),
            shop_service: ShopService::new(shop_repo.clone()),
            noodle_service: NoodleService::new(
                noodle_repo.clone(),
                shop_repo,
                user_repo.clone(),
                image_repo.clone(),
                like_repo.clone(),
                badge_service.clone(),
            ),
            like_service: LikeService::new(
                like_repo.clone(),
                noodle_repo.clone(),
                notification_service.clone(),
            ),
            comment_service: CommentService::new(
                comment_repo.clone(),
                comment_like_repo.clone(),
                noodle_repo.clone(),
                user_repo.clone(),
                notification_service.clone(),
            ),
            comment_like_service: CommentLikeService::new(comment_like_repo, comment_repo),
            notification_service,
            badge_service,
            ranking_service: RankingService::new(noodle_repo.clone(), like_repo, user_repo),
            my_best_service: MyBestService::new(my_best_repo, noodle_repo),
            feedback_service: FeedbackService::new(feedback_repo, steam_repo),
            station_service: StationService::new(station_repo),
            image_service: ImageService::new(
                image_repo,
                storage,
                config.storage.max_upload_bytes,
            ),
            token_verifier: TokenVerifier::new(&config.auth),
            shop_info_cache,
            shop_info_settings: config.shop_info.clone(),
            max_upload_bytes: config.storage.max_upload_bytes,
        }
    }
}

/// Authentication middleware.
///
/// A valid bearer token puts its claims into the request extensions; the
/// matching active user is added as well once it has been stored. Requests
/// without a usable token pass through anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    if let Some(token) = token
        && let Ok(claims) = state.token_verifier.verify(token)
    {
        match state.user_service.me(&claims.sub).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => debug!(sub = %claims.sub, error = %e, "No active user for identity"),
        }
        req.extensions_mut().insert(claims);
    }

    next.run(req).await
}
