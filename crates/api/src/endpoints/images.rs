//! Image endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{get, post},
};
use menlog_common::{AppError, AppResult};
use menlog_db::entities::image;
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Success, success},
};

/// Upload an image via multipart form (field `file`).
async fn upload(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<image::Model>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        file_name = field.file_name().map(ToString::to_string);
        content_type = field.content_type().map(ToString::to_string);
        file_data = Some(
            field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?
                .to_vec(),
        );
    }

    let data = file_data.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let image = state
        .image_service
        .upload(
            &user.id,
            file_name.as_deref(),
            content_type.as_deref(),
            &data,
        )
        .await?;
    Ok(ApiResponse::ok(image))
}

/// Request naming a single image.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIdRequest {
    pub image_id: String,
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ImageIdRequest>,
) -> AppResult<ApiResponse<Success>> {
    state.image_service.delete(&user.id, &req.image_id).await?;
    Ok(success())
}

async fn show(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> AppResult<ApiResponse<image::Model>> {
    let mut image = state.image_service.get(&image_id).await?;
    image.url = state.image_service.public_url(&image);
    Ok(ApiResponse::ok(image))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .route("/delete", post(delete))
        .route("/{id}", get(show))
}
