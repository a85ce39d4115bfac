//! PostgreSQL post repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::post::{Post, PostFilter, PostId, PostRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const POST_COLUMNS: &str = r#"
    id, title, content, markdown_source, sanitized_html, author_handle, author_email,
    author_id, created_at, like_count
"#;

/// PostgreSQL implementation of PostRepository
#[derive(Debug, Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, content, markdown_source, sanitized_html,
                               author_handle, author_email, author_id, created_at, like_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(post.id().as_str())
        .bind(post.title())
        .bind(post.content())
        .bind(post.markdown_source())
        .bind(post.sanitized_html())
        .bind(post.author_handle())
        .bind(post.author_email())
        .bind(post.author_id().as_str())
        .bind(post.created_at())
        .bind(count_to_db(post.like_count()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("Post with ID '{}' already exists", post.id()))
            } else {
                DomainError::storage(format!("Failed to create post: {}", e))
            }
        })?;

        Ok(post)
    }

    async fn get(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get post: {}", e)))?;

        row.as_ref().map(row_to_post).transpose()
    }

    async fn find(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError> {
        let rows = match filter {
            PostFilter::All => {
                sqlx::query(&format!(
                    "SELECT {} FROM posts ORDER BY created_at DESC",
                    POST_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
            PostFilter::Search(term) => {
                sqlx::query(&format!(
                    r#"
                    SELECT {} FROM posts
                    WHERE title ILIKE $1 ESCAPE '\' OR content ILIKE $1 ESCAPE '\'
                    ORDER BY created_at DESC
                    "#,
                    POST_COLUMNS
                ))
                .bind(like_pattern(term.as_str()))
                .fetch_all(&self.pool)
                .await
            }
            PostFilter::Author(author_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM posts WHERE author_id = $1 ORDER BY created_at DESC",
                    POST_COLUMNS
                ))
                .bind(author_id.as_str())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| DomainError::storage(format!("Failed to find posts: {}", e)))?;

        rows.iter().map(row_to_post).collect()
    }

    async fn adjust_likes(&self, id: &PostId, delta: i64) -> Result<Post, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE posts SET like_count = GREATEST(like_count + $2, 0)
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(id.as_str())
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to adjust like count: {}", e)))?;

        match row {
            Some(row) => row_to_post(&row),
            None => Err(DomainError::not_found(format!("Post '{}' not found", id))),
        }
    }

    async fn set_like_count(&self, id: &PostId, count: u64) -> Result<Post, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET like_count = $2 WHERE id = $1 RETURNING {}",
            POST_COLUMNS
        ))
        .bind(id.as_str())
        .bind(count_to_db(count))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to set like count: {}", e)))?;

        match row {
            Some(row) => row_to_post(&row),
            None => Err(DomainError::not_found(format!("Post '{}' not found", id))),
        }
    }

    async fn delete(&self, id: &PostId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete post: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');

    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

fn count_to_db(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn row_to_post(row: &sqlx::postgres::PgRow) -> Result<Post, DomainError> {
    let id: String = row.get("id");
    let author_id: String = row.get("author_id");
    let created_at: DateTime<Utc> = row.get("created_at");
    let like_count: i64 = row.get("like_count");

    let post_id = PostId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid post ID in database: {}", e)))?;
    let author_id = UserId::new(author_id)
        .map_err(|e| DomainError::storage(format!("Invalid author ID in database: {}", e)))?;

    Ok(Post::restore(
        post_id,
        row.get("title"),
        row.get("content"),
        row.get("markdown_source"),
        row.get("sanitized_html"),
        row.get("author_handle"),
        row.get("author_email"),
        author_id,
        created_at,
        like_count.max(0) as u64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }

    #[test]
    fn test_count_to_db_saturates() {
        assert_eq!(count_to_db(3), 3);
        assert_eq!(count_to_db(u64::MAX), i64::MAX);
    }
}
