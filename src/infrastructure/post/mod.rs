//! Post infrastructure module
//!
//! In-memory and PostgreSQL implementations of the post store.

mod postgres_repository;
mod repository;

pub use postgres_repository::PostgresPostRepository;
pub use repository::InMemoryPostRepository;
