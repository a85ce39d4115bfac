//! Read side: home feed, search, single post and profile pages

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::domain::post::{sort_newest_first, Post, PostFilter, PostId, PostRepository, SearchTerm};
use crate::domain::trending::{TrendingArticle, TrendingFeed};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Clone, Serialize)]
pub struct HomeFeed {
    pub posts: Vec<Post>,
    /// Posts the viewer has liked; empty for anonymous viewers
    pub liked_post_ids: Vec<PostId>,
    pub trending: Vec<TrendingArticle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub title: String,
    pub query: String,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub is_author: bool,
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user_id: UserId,
    pub display_handle: String,
    pub posts: Vec<Post>,
    /// True when someone other than the profile owner is looking
    pub visitor: bool,
}

impl ProfileView {
    fn of(user: User, visitor: bool) -> Self {
        let mut posts = user.posts().to_vec();
        sort_newest_first(&mut posts);

        Self {
            user_id: user.id().clone(),
            display_handle: user.display_handle().to_string(),
            posts,
            visitor,
        }
    }
}

/// Read-only queries over both stores
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    trending: Arc<dyn TrendingFeed>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        trending: Arc<dyn TrendingFeed>,
    ) -> Self {
        Self {
            posts,
            users,
            trending,
        }
    }

    /// All posts newest first, the viewer's likes and the trending sidebar
    pub async fn home(&self, viewer: Option<&UserId>) -> Result<HomeFeed, DomainError> {
        let (posts, trending, liked_post_ids) = tokio::join!(
            self.posts.find(&PostFilter::All),
            self.trending.top_articles(),
            self.liked_by(viewer)
        );

        let mut posts = posts?;
        sort_newest_first(&mut posts);

        Ok(HomeFeed {
            posts,
            liked_post_ids,
            trending,
        })
    }

    /// Literal, case-insensitive match on title or content
    pub async fn search(&self, query: &str) -> Result<SearchResults, DomainError> {
        let term = SearchTerm::new(query)?;
        let title = format!("Search Results for \"{}\"", term.as_str());

        let mut posts = self.posts.find(&PostFilter::Search(term.clone())).await?;
        sort_newest_first(&mut posts);

        Ok(SearchResults {
            title,
            query: term.as_str().to_string(),
            posts,
        })
    }

    pub async fn post(&self, viewer: Option<&User>, id: &str) -> Result<PostView, DomainError> {
        let not_found = || DomainError::not_found(format!("Post '{}' not found", id));

        let post_id = PostId::new(id).map_err(|_| not_found())?;
        let post = self.posts.get(&post_id).await?.ok_or_else(not_found)?;

        let is_author = viewer.is_some_and(|v| v.id() == post.author_id());
        let liked = viewer.is_some_and(|v| v.has_liked(&post_id));

        Ok(PostView {
            post,
            is_author,
            liked,
        })
    }

    /// The signed-in user's own posts
    pub fn own_profile(&self, viewer: User) -> ProfileView {
        ProfileView::of(viewer, false)
    }

    /// Another user's posts; asking for yourself yields the owner view
    pub async fn profile(
        &self,
        viewer: Option<&UserId>,
        id: &str,
    ) -> Result<ProfileView, DomainError> {
        let not_found = || DomainError::not_found(format!("User '{}' not found", id));

        let user_id = UserId::new(id).map_err(|_| not_found())?;
        let user = self.users.get(&user_id).await?.ok_or_else(not_found)?;

        let visitor = viewer != Some(&user_id);
        Ok(ProfileView::of(user, visitor))
    }

    /// Round trip to both stores, used by the readiness probe
    pub async fn check_storage(&self) -> Result<(), DomainError> {
        let probe_post = PostId::new("readiness-probe")?;
        let probe_user = UserId::new("readiness-probe")
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let (posts, users) = tokio::join!(self.posts.get(&probe_post), self.users.get(&probe_user));
        posts?;
        users?;

        Ok(())
    }

    async fn liked_by(&self, viewer: Option<&UserId>) -> Vec<PostId> {
        let Some(id) = viewer else {
            return Vec::new();
        };

        match self.users.get(id).await {
            Ok(Some(user)) => user.liked_post_ids().iter().cloned().collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(user_id = %id, error = %e, "Could not load viewer likes");
                Vec::new()
            }
        }
    }
}
