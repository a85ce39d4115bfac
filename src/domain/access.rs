//! Authorization rules for post mutation

use crate::domain::post::Post;
use crate::domain::user::User;

/// Whether `actor` may delete `post`: its author, or any admin
pub fn can_delete(actor: &User, post: &Post) -> bool {
    actor.id() == post.author_id() || actor.role().is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::{MarkdownRenderer, PostDraft, PostId};
    use crate::domain::user::{Role, UserId, Verification};
    use chrono::Utc;

    struct Plain;

    impl MarkdownRenderer for Plain {
        fn render(&self, markdown: &str) -> String {
            markdown.to_string()
        }
    }

    fn user(id: &str, role: Role) -> User {
        let mut user = User::new_local(
            UserId::new(id).unwrap(),
            format!("{}@example.com", id),
            id,
            "hash",
            Verification::new("t", Utc::now()),
        );
        user.set_role(role);
        user
    }

    fn post_by(author: &User) -> Post {
        Post::compose(
            PostId::generate(),
            PostDraft::new("t", "c", None),
            author,
            &Plain,
        )
    }

    #[test]
    fn test_author_may_delete() {
        let author = user("author", Role::Standard);
        assert!(can_delete(&author, &post_by(&author)));
    }

    #[test]
    fn test_admin_may_delete_any_post() {
        let author = user("author", Role::Standard);
        let admin = user("moderator", Role::Admin);
        assert!(can_delete(&admin, &post_by(&author)));
        assert!(can_delete(&admin, &post_by(&admin)));
    }

    #[test]
    fn test_other_standard_user_may_not_delete() {
        let author = user("author", Role::Standard);
        let other = user("other", Role::Standard);
        assert!(!can_delete(&other, &post_by(&author)));
    }
}
