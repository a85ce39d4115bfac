//! Post handlers: read, compose, like and delete

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ActionResponse, PostResponse};
use crate::api::middleware::{MaybeUser, RequireUser, RequireVerifiedUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{DomainError, Message, PostDraft, PostId};
use crate::infrastructure::services::LikeOutcome;

#[derive(Debug, Serialize)]
pub struct PostViewResponse {
    pub post: PostResponse,
    pub is_author: bool,
    pub liked: bool,
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub post_id: String,
    pub liked: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub post_id: String,
}

/// Malformed ids cannot name a stored post
fn parse_post_id(raw: &str) -> Result<PostId, DomainError> {
    PostId::new(raw).map_err(|_| DomainError::not_found(format!("Post '{}' not found", raw)))
}

/// GET /posts/{post_id}
pub async fn get_post(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(post_id): Path<String>,
) -> Result<Json<PostViewResponse>, ApiError> {
    let view = state.feed.post(viewer.user(), &post_id).await?;

    Ok(Json(PostViewResponse {
        post: PostResponse::from(&view.post),
        is_author: view.is_author,
        liked: view.liked,
    }))
}

/// POST /compose
///
/// Author fields are taken from the session's user record; the body only
/// carries title, content and optional markdown.
pub async fn compose(
    State(state): State<AppState>,
    RequireVerifiedUser(user): RequireVerifiedUser,
    Json(draft): Json<PostDraft>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    debug!(user_id = %user.id(), "Composing post");

    let post = state.submissions.submit(user.id(), draft).await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(&post))))
}

/// POST /like
pub async fn set_liked(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<LikeRequest>,
) -> Result<Json<LikeOutcome>, ApiError> {
    let post_id = parse_post_id(&request.post_id)?;

    let outcome = state
        .likes
        .set_liked(user.id(), &post_id, request.liked)
        .await?;

    Ok(Json(outcome))
}

/// POST /delete
pub async fn delete_post(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let post_id = parse_post_id(&request.post_id)?;

    state.submissions.delete(user.id(), &post_id).await?;

    Ok(Json(ActionResponse {
        message: Message::success("Post deleted."),
        redirect: Some("/profile".to_string()),
    }))
}
