//! Account endpoints: sign-up, email verification, sign-in and session info
//!
//! Sessions are stateless JWTs, so logout only tells the client to drop its token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::User;
use crate::domain::Message;
use crate::infrastructure::user::{RegisterRequest, SignedIn};

const PENDING_VERIFICATION: &str =
    "Almost there! We sent a verification link to your email.";

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/verify/{token}", get(verify))
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub handle: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// User response (safe to expose)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub handle: String,
    pub is_verified: bool,
    pub role: String,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            email: user.login_email().to_string(),
            handle: user.display_handle().to_string(),
            is_verified: user.is_verified(),
            role: user.role().as_str().to_string(),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub message: Message,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
    pub redirect: String,
}

impl From<SignedIn> for SessionResponse {
    fn from(signed_in: SignedIn) -> Self {
        Self {
            token: signed_in.token,
            expires_at: signed_in.expires_at.to_rfc3339(),
            user: UserResponse::from(&signed_in.user),
            redirect: "/".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: Message,
    pub redirect: String,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    debug!("Registering account");

    let user = state
        .accounts
        .register(RegisterRequest {
            email: request.email,
            handle: request.handle,
            password: request.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            message: Message::info(PENDING_VERIFICATION),
            user: UserResponse::from(&user),
        }),
    ))
}

/// POST /auth/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let signed_in = state
        .accounts
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(signed_in.into()))
}

/// GET /auth/verify/{token}
///
/// Confirms the account and signs it in straight away.
pub async fn verify(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let signed_in = state
        .accounts
        .verify_email(&token)
        .await
        .map_err(|e| ApiError::from(e).with_redirect("/signin"))?;

    Ok(Json(signed_in.into()))
}

/// POST /auth/logout
pub async fn logout(_user: RequireUser) -> Json<LogoutResponse> {
    Json(LogoutResponse {
        message: Message::success("Logged out successfully"),
        redirect: "/".to_string(),
    })
}

/// GET /auth/me
pub async fn get_current_user(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
