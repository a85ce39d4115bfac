//! Profile handlers

use axum::extract::{Path, State};
use serde::Serialize;

use super::{post_list, PostResponse};
use crate::api::middleware::{MaybeUser, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::services::ProfileView;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub handle: String,
    pub posts: Vec<PostResponse>,
    pub visitor: bool,
}

impl From<ProfileView> for ProfileResponse {
    fn from(view: ProfileView) -> Self {
        Self {
            user_id: view.user_id.to_string(),
            handle: view.display_handle,
            posts: post_list(&view.posts),
            visitor: view.visitor,
        }
    }
}

/// GET /profile
pub async fn own_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Json<ProfileResponse> {
    Json(state.feed.own_profile(user).into())
}

/// GET /profile/{user_id}
pub async fn get_profile(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let view = state
        .feed
        .profile(viewer.user().map(|u| u.id()), &user_id)
        .await?;

    Ok(Json(view.into()))
}
