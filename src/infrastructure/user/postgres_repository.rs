//! PostgreSQL user repository implementation

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::domain::post::{Post, PostId};
use crate::domain::user::{Role, User, UserId, UserRepository, Verification};
use crate::domain::DomainError;

const USER_COLUMNS: &str = r#"
    id, login_email, credential_hash, external_identity_id, display_handle, posts,
    liked_post_ids, is_verified, verification_token, verification_expires_at, role,
    created_at, updated_at
"#;

/// PostgreSQL implementation of UserRepository
///
/// The liked set is a `TEXT[]` column and the mirrored posts a `JSONB` array;
/// each primitive is one conditional `UPDATE` so membership checks cannot race.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        value: &str,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, clause);

        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn ensure_exists(&self, id: &UserId) -> Result<(), DomainError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check user: {}", e)))?;

        if exists {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("User '{}' not found", id)))
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("id", id.as_str()).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("login_email", email).await
    }

    async fn get_by_handle(&self, handle: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("display_handle", handle).await
    }

    async fn get_by_external_id(&self, external_id: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("external_identity_id", external_id)
            .await
    }

    async fn find_by_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users WHERE verification_token = $1 AND verification_expires_at > $2",
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(token)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to look up verification token: {}", e))
            })?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let verification = user.verification();
        let liked: Vec<String> = user
            .liked_post_ids()
            .iter()
            .map(|id| id.as_str().to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO users (id, login_email, credential_hash, external_identity_id,
                               display_handle, posts, liked_post_ids, is_verified,
                               verification_token, verification_expires_at, role,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.login_email())
        .bind(user.credential_hash())
        .bind(user.external_identity_id())
        .bind(user.display_handle())
        .bind(Json(user.posts()))
        .bind(liked)
        .bind(user.is_verified())
        .bind(verification.map(|v| v.token.as_str()))
        .bind(verification.map(|v| v.expires_at))
        .bind(user.role().as_str())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user, "create"))?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let verification = user.verification();

        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET login_email = $2, credential_hash = $3, external_identity_id = $4,
                display_handle = $5, is_verified = $6, verification_token = $7,
                verification_expires_at = $8, role = $9, updated_at = $10
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id().as_str())
        .bind(user.login_email())
        .bind(user.credential_hash())
        .bind(user.external_identity_id())
        .bind(user.display_handle())
        .bind(user.is_verified())
        .bind(verification.map(|v| v.token.as_str()))
        .bind(verification.map(|v| v.expires_at))
        .bind(user.role().as_str())
        .bind(user.updated_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, user, "update"))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.id()
            ))),
        }
    }

    async fn add_liked_post(&self, id: &UserId, post_id: &PostId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET liked_post_ids = array_append(liked_post_ids, $2), updated_at = NOW()
            WHERE id = $1 AND NOT ($2 = ANY(liked_post_ids))
            "#,
        )
        .bind(id.as_str())
        .bind(post_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to add liked post: {}", e)))?;

        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
            return Ok(false);
        }

        Ok(true)
    }

    async fn remove_liked_post(
        &self,
        id: &UserId,
        post_id: &PostId,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET liked_post_ids = array_remove(liked_post_ids, $2), updated_at = NOW()
            WHERE id = $1 AND $2 = ANY(liked_post_ids)
            "#,
        )
        .bind(id.as_str())
        .bind(post_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to remove liked post: {}", e)))?;

        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
            return Ok(false);
        }

        Ok(true)
    }

    async fn push_post(&self, id: &UserId, post: &Post) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET posts = posts || $2::jsonb, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(Json([post]))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to mirror post: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        Ok(())
    }

    async fn pull_post(&self, id: &UserId, post_id: &PostId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET posts = COALESCE(
                    (SELECT jsonb_agg(p) FROM jsonb_array_elements(posts) AS p
                     WHERE p->>'id' <> $2),
                    '[]'::jsonb),
                updated_at = NOW()
            WHERE id = $1 AND posts @> jsonb_build_array(jsonb_build_object('id', $2::text))
            "#,
        )
        .bind(id.as_str())
        .bind(post_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to remove mirrored post: {}", e)))?;

        if result.rows_affected() == 0 {
            self.ensure_exists(id).await?;
            return Ok(false);
        }

        Ok(true)
    }

    async fn count_likers(&self, post_id: &PostId) -> Result<u64, DomainError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE $1 = ANY(liked_post_ids)")
                .bind(post_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to count likers: {}", e)))?;

        Ok(count.max(0) as u64)
    }

    async fn prune_liked_posts(&self, existing: &[PostId]) -> Result<u64, DomainError> {
        let existing: Vec<String> = existing.iter().map(|id| id.as_str().to_string()).collect();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET liked_post_ids = ARRAY(
                    SELECT liked FROM unnest(liked_post_ids) AS liked
                    WHERE liked = ANY($1::text[])),
                updated_at = NOW()
            WHERE NOT (liked_post_ids <@ $1::text[])
            "#,
        )
        .bind(existing)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to prune liked posts: {}", e)))?;

        Ok(result.rows_affected())
    }
}

fn map_write_error(error: sqlx::Error, user: &User, action: &str) -> DomainError {
    let msg = error.to_string();

    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        if msg.contains("login_email") {
            DomainError::conflict(format!("Email '{}' already exists", user.login_email()))
        } else if msg.contains("display_handle") {
            DomainError::conflict(format!(
                "Handle '{}' already exists",
                user.display_handle()
            ))
        } else if msg.contains("external_identity_id") {
            DomainError::conflict("External identity already linked")
        } else {
            DomainError::conflict(format!("User with ID '{}' already exists", user.id()))
        }
    } else {
        DomainError::storage(format!("Failed to {} user: {}", action, error))
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: String = row.get("id");
    let posts: Json<Vec<Post>> = row
        .try_get("posts")
        .map_err(|e| DomainError::storage(format!("Invalid mirrored posts in database: {}", e)))?;
    let liked: Vec<String> = row.get("liked_post_ids");
    let token: Option<String> = row.get("verification_token");
    let expires_at: Option<DateTime<Utc>> = row.get("verification_expires_at");
    let role: String = row.get("role");

    let user_id = UserId::new(&id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    let liked_post_ids = liked
        .into_iter()
        .map(PostId::new)
        .collect::<Result<BTreeSet<_>, _>>()
        .map_err(|e| DomainError::storage(format!("Invalid liked post ID in database: {}", e)))?;

    let verification = match (token, expires_at) {
        (Some(token), Some(expires_at)) => Some(Verification::new(token, expires_at)),
        _ => None,
    };

    Ok(User::restore(
        user_id,
        row.get("login_email"),
        row.get("credential_hash"),
        row.get("external_identity_id"),
        row.get("display_handle"),
        posts.0,
        liked_post_ids,
        row.get("is_verified"),
        verification,
        Role::from_str_lossy(&role),
        row.get("created_at"),
        row.get("updated_at"),
    ))
}
