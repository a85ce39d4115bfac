//! Infrastructure layer - store implementations, outbound clients and services

pub mod auth;
pub mod logging;
pub mod markdown;
pub mod notification;
pub mod post;
pub mod services;
pub mod storage;
pub mod trending;
pub mod user;
