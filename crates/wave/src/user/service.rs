//! User service for business logic.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, instrument};

use super::models::{CreateUser, UpdateProfileRequest, User};
use super::repository::UserRepository;

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Service for user management operations.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Register a new user with validation.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        if !is_valid_username(&request.username) {
            bail!(
                "Invalid username format. Must be 3-50 alphanumeric characters, underscores, or hyphens."
            );
        }

        if !is_valid_email(&request.email) {
            bail!("Invalid email format.");
        }

        if request.password.len() < 6 {
            bail!("Password must be at least 6 characters.");
        }

        if !self.repo.is_username_available(&request.username).await? {
            bail!("Username '{}' is already taken.", request.username);
        }

        if !self.repo.is_email_available(&request.email).await? {
            bail!("Email '{}' is already registered.", request.email);
        }

        let full_name = request
            .full_name
            .unwrap_or_else(|| request.username.clone());

        let user = self
            .repo
            .create(CreateUser {
                username: request.username,
                email: request.email,
                password_hash: hash_password(&request.password)?,
                full_name,
            })
            .await?;
        info!(user_id = user.id, username = %user.username, "Created new user");

        Ok(user)
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.repo.get(id).await
    }

    /// Update the caller's profile.
    #[instrument(skip(self, request))]
    pub async fn update_profile(&self, id: i64, request: UpdateProfileRequest) -> Result<User> {
        let user = self.repo.update_profile(id, request).await?;
        info!(user_id = user.id, "Updated user profile");

        Ok(user)
    }

    /// Verify credentials against the user store.
    ///
    /// The login identifier may be a username or an email address. Returns
    /// `None` for unknown identifiers and wrong passwords alike.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, login: &str, password: &str) -> Result<Option<User>> {
        let user = match self.repo.get_by_username(login).await? {
            Some(user) => Some(user),
            None => self.repo.get_by_email(login).await?,
        };

        match user {
            Some(user) if verify_password(password, &user.password_hash)? => Ok(Some(user)),
            _ => Ok(None),
        }
    }
}

/// Validate username format.
fn is_valid_username(username: &str) -> bool {
    let len = username.len();
    if !(3..=50).contains(&len) {
        return false;
    }

    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    !parts[0].is_empty() && parts[1].contains('.')
}

/// Hash a password using bcrypt.
fn hash_password(password: &str) -> Result<String> {
    // Use a lower cost factor for development speed
    let cost = if cfg!(debug_assertions) { 4 } else { 10 };
    bcrypt::hash(password, cost).context("Failed to hash password")
}

/// Verify a password against a bcrypt hash.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}
