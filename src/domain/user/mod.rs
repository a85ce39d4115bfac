//! User domain
//!
//! Accounts, their verification state, role, liked posts and the mirrored
//! copies of the posts they authored.

mod entity;
mod repository;
mod validation;

pub use entity::{ExternalProfile, Role, User, UserId, Verification};
pub use repository::UserRepository;
pub use validation::{
    validate_email, validate_handle, validate_password, validate_user_id, UserValidationError,
};

#[cfg(test)]
pub use repository::MockUserRepository;
