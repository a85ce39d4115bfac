//! Home feed and search handlers

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{post_list, PostResponse};
use crate::api::middleware::MaybeUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::TrendingArticle;

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub posts: Vec<PostResponse>,
    pub liked_post_ids: Vec<String>,
    pub trending: Vec<TrendingArticle>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub title: String,
    pub query: String,
    pub posts: Vec<PostResponse>,
}

/// GET /
pub async fn home(
    State(state): State<AppState>,
    viewer: MaybeUser,
) -> Result<Json<HomeResponse>, ApiError> {
    let feed = state.feed.home(viewer.user().map(|u| u.id())).await?;

    Ok(Json(HomeResponse {
        posts: post_list(&feed.posts),
        liked_post_ids: feed.liked_post_ids.iter().map(|id| id.to_string()).collect(),
        trending: feed.trending,
    }))
}

/// GET /search?query=
///
/// A blank query sends the client back home.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let results = state
        .feed
        .search(&params.query)
        .await
        .map_err(|e| ApiError::from(e).with_redirect("/"))?;

    Ok(Json(SearchResponse {
        title: results.title,
        query: results.query,
        posts: post_list(&results.posts),
    }))
}
