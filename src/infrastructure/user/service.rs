//! Account service: registration, email verification and sign-in

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::notification::{EmailMessage, Notifier};
use crate::domain::user::{
    validate_email, validate_handle, validate_password, ExternalProfile, User, UserId,
    UserRepository, Verification,
};
use crate::domain::DomainError;
use crate::infrastructure::auth::JwtGenerator;

use super::password::{generate_verification_token, PasswordHasher};

pub const DUPLICATE_EMAIL: &str = "An account with this email already exists.";
pub const DUPLICATE_HANDLE: &str = "This username is already taken. Please choose another one.";
const INVALID_CREDENTIALS: &str = "Invalid email or password.";
const NOT_VERIFIED: &str = "Your account is not verified. Please check your email.";
const INVALID_TOKEN: &str = "Verification token is invalid or has expired.";
const VERIFICATION_SEND_FAILED: &str = "Could not send verification email. Please contact support.";

const SENDER_NAME: &str = "BLOGGY";

/// Request for registering a local account
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub handle: String,
    pub password: String,
}

/// A user together with a freshly issued session token
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Settings for the account flows
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Base URL used to build verification links
    pub public_url: String,
    pub token_ttl_minutes: i64,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:3000".to_string(),
            token_ttl_minutes: 60,
        }
    }
}

/// Account service for registration and authentication
pub struct AccountService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: Arc<dyn JwtGenerator>,
    notifier: Arc<dyn Notifier>,
    settings: AccountSettings,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        sessions: Arc<dyn JwtGenerator>,
        notifier: Arc<dyn Notifier>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            repository,
            hasher,
            sessions,
            notifier,
            settings,
        }
    }

    /// Create an unverified account and send its verification link
    ///
    /// When the email cannot be sent the account is kept and the caller gets
    /// `DependencyFailed`.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        let email = normalize_email(&request.email);
        let handle = request.handle.trim().to_string();

        validate_email(&email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_handle(&handle).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        self.ensure_unique(&email, &handle).await?;

        let credential_hash = self.hasher.hash(&request.password)?;
        let token = generate_verification_token();
        let expires_at = Utc::now() + Duration::minutes(self.settings.token_ttl_minutes);

        let user = User::new_local(
            UserId::generate(),
            &email,
            &handle,
            credential_hash,
            Verification::new(&token, expires_at),
        );

        let user = match self.repository.create(user).await {
            Ok(user) => user,
            // lost a race with a concurrent registration
            Err(DomainError::Conflict { message }) => {
                self.ensure_unique(&email, &handle).await?;
                return Err(DomainError::conflict(message));
            }
            Err(e) => return Err(e),
        };

        info!(user_id = %user.id(), "Registered account pending verification");

        let message = EmailMessage::new(
            SENDER_NAME,
            user.login_email(),
            "Verify Your Email for BLOGGY",
            format!(
                "Hello {},\n\nPlease verify your account by clicking the link: \n{}/auth/verify/{}\n\nThis link will expire in {} minutes.\n",
                user.display_handle(),
                self.settings.public_url.trim_end_matches('/'),
                token,
                self.settings.token_ttl_minutes
            ),
        );

        if let Err(e) = self.notifier.send(&message).await {
            warn!(user_id = %user.id(), error = %e, "Verification email failed");
            return Err(DomainError::dependency("mail", VERIFICATION_SEND_FAILED));
        }

        Ok(user)
    }

    /// Confirm an account from its emailed token and sign it in
    pub async fn verify_email(&self, token: &str) -> Result<SignedIn, DomainError> {
        let mut user = self
            .repository
            .find_by_verification_token(token, Utc::now())
            .await?
            .ok_or_else(|| DomainError::not_found(INVALID_TOKEN))?;

        user.mark_verified();
        let user = self.repository.update(&user).await?;

        info!(user_id = %user.id(), "Account verified");

        self.sign_in(user)
    }

    /// Check local credentials
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SignedIn, DomainError> {
        let email = normalize_email(email);

        let user = self
            .repository
            .get_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::unauthenticated(INVALID_CREDENTIALS))?;

        let hash = user
            .credential_hash()
            .ok_or_else(|| DomainError::unauthenticated(INVALID_CREDENTIALS))?;

        if !self.hasher.verify(password, hash) {
            return Err(DomainError::unauthenticated(INVALID_CREDENTIALS));
        }

        if !user.is_verified() {
            return Err(DomainError::unverified(NOT_VERIFIED));
        }

        self.sign_in(user)
    }

    /// Find or create the account linked to an identity-provider profile
    pub async fn sign_in_federated(
        &self,
        profile: ExternalProfile,
    ) -> Result<SignedIn, DomainError> {
        if let Some(user) = self
            .repository
            .get_by_external_id(&profile.external_id)
            .await?
        {
            return self.sign_in(user);
        }

        let id = UserId::generate();
        let mut profile = ExternalProfile {
            email: normalize_email(&profile.email),
            display_name: profile.display_name.trim().to_string(),
            ..profile
        };

        if self
            .repository
            .get_by_handle(&profile.display_name)
            .await?
            .is_some()
        {
            let suffix: String = id.as_str().chars().take(8).collect();
            profile.display_name = format!("{}-{}", profile.display_name, suffix);
        }

        let user = match self
            .repository
            .create(User::new_federated(id, &profile))
            .await
        {
            Ok(user) => user,
            Err(DomainError::Conflict { .. }) => {
                return Err(DomainError::validation(DUPLICATE_EMAIL));
            }
            Err(e) => return Err(e),
        };

        info!(user_id = %user.id(), "Created federated account");

        self.sign_in(user)
    }

    /// Resolve a session token to the current user record
    pub async fn current_user(&self, token: &str) -> Result<User, DomainError> {
        let claims = self.sessions.validate(token)?;

        let user_id = UserId::new(claims.user_id())
            .map_err(|_| DomainError::unauthenticated("Invalid session."))?;

        self.repository
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::unauthenticated("Your session has ended. Please sign in."))
    }

    /// Get a user by id
    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        let user_id = UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.repository.get(&user_id).await
    }

    fn sign_in(&self, user: User) -> Result<SignedIn, DomainError> {
        let token = self.sessions.generate(&user)?;
        let expires_at = Utc::now() + Duration::hours(self.sessions.expiration_hours() as i64);

        Ok(SignedIn {
            user,
            token,
            expires_at,
        })
    }

    async fn ensure_unique(&self, email: &str, handle: &str) -> Result<(), DomainError> {
        if self.repository.get_by_email(email).await?.is_some() {
            return Err(DomainError::validation(DUPLICATE_EMAIL));
        }

        if self.repository.get_by_handle(handle).await?.is_some() {
            return Err(DomainError::validation(DUPLICATE_HANDLE));
        }

        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
