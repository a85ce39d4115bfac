//! User entity and related types

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_user_id, UserValidationError};
use crate::domain::post::{Post, PostId};

/// User identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Standard,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Admin => "admin",
        }
    }

    /// Parse a stored role, falling back to the least privileged one
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            _ => Self::Standard,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Pending email verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Verification {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// A token is only accepted strictly before its expiry
    pub fn accepts(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.token == token && self.expires_at > now
    }
}

/// Profile handed over by the external identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProfile {
    pub external_id: String,
    pub display_name: String,
    pub email: String,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    /// Login identifier, unique across users
    login_email: String,
    /// Argon2 hash, absent for identity-provider-only accounts
    #[serde(skip_serializing, default)]
    credential_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    external_identity_id: Option<String>,
    display_handle: String,
    /// Denormalized copies of the posts this user authored, in creation order
    #[serde(default)]
    posts: Vec<Post>,
    #[serde(default)]
    liked_post_ids: BTreeSet<PostId>,
    #[serde(default)]
    is_verified: bool,
    #[serde(skip_serializing, default)]
    verification: Option<Verification>,
    #[serde(default)]
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create an unverified account backed by a local credential
    pub fn new_local(
        id: UserId,
        login_email: impl Into<String>,
        display_handle: impl Into<String>,
        credential_hash: impl Into<String>,
        verification: Verification,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            login_email: login_email.into(),
            credential_hash: Some(credential_hash.into()),
            external_identity_id: None,
            display_handle: display_handle.into(),
            posts: Vec::new(),
            liked_post_ids: BTreeSet::new(),
            is_verified: false,
            verification: Some(verification),
            role: Role::Standard,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a federated account; the identity provider vouches for the email
    pub fn new_federated(id: UserId, profile: &ExternalProfile) -> Self {
        let now = Utc::now();

        Self {
            id,
            login_email: profile.email.clone(),
            credential_hash: None,
            external_identity_id: Some(profile.external_id.clone()),
            display_handle: profile.display_name.clone(),
            posts: Vec::new(),
            liked_post_ids: BTreeSet::new(),
            is_verified: true,
            verification: None,
            role: Role::Standard,
            created_at: now,
            updated_at: now,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn login_email(&self) -> &str {
        &self.login_email
    }

    pub fn credential_hash(&self) -> Option<&str> {
        self.credential_hash.as_deref()
    }

    pub fn external_identity_id(&self) -> Option<&str> {
        self.external_identity_id.as_deref()
    }

    pub fn display_handle(&self) -> &str {
        &self.display_handle
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn liked_post_ids(&self) -> &BTreeSet<PostId> {
        &self.liked_post_ids
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn verification(&self) -> Option<&Verification> {
        self.verification.as_ref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_liked(&self, post_id: &PostId) -> bool {
        self.liked_post_ids.contains(post_id)
    }

    // Mutators

    /// Confirm the account and drop the pending token
    pub fn mark_verified(&mut self) {
        self.is_verified = true;
        self.verification = None;
        self.touch();
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.touch();
    }

    /// Returns true when membership changed
    pub fn like(&mut self, post_id: PostId) -> bool {
        let inserted = self.liked_post_ids.insert(post_id);
        if inserted {
            self.touch();
        }
        inserted
    }

    /// Returns true when membership changed
    pub fn unlike(&mut self, post_id: &PostId) -> bool {
        let removed = self.liked_post_ids.remove(post_id);
        if removed {
            self.touch();
        }
        removed
    }

    /// Drop liked ids rejected by `keep`; returns how many were dropped
    pub fn retain_liked(&mut self, keep: impl Fn(&PostId) -> bool) -> usize {
        let before = self.liked_post_ids.len();
        self.liked_post_ids.retain(|id| keep(id));
        let dropped = before - self.liked_post_ids.len();
        if dropped > 0 {
            self.touch();
        }
        dropped
    }

    pub fn push_post(&mut self, post: Post) {
        self.posts.push(post);
        self.touch();
    }

    /// Returns true when a mirrored copy was removed
    pub fn pull_post(&mut self, post_id: &PostId) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id() != post_id);
        let removed = self.posts.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Restore a user from persisted columns
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: UserId,
        login_email: String,
        credential_hash: Option<String>,
        external_identity_id: Option<String>,
        display_handle: String,
        posts: Vec<Post>,
        liked_post_ids: BTreeSet<PostId>,
        is_verified: bool,
        verification: Option<Verification>,
        role: Role,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            login_email,
            credential_hash,
            external_identity_id,
            display_handle,
            posts,
            liked_post_ids,
            is_verified,
            verification,
            role,
            created_at,
            updated_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
