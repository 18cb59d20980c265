//! User service
//!
//! Users exist to author posts and comments and to like posts. Creating
//! them is an admin action; there is no login.

use crate::db::repositories::{is_unique_violation, UserRepository};
use crate::models::{CreateUserInput, User, MAX_USERNAME_LENGTH};
use anyhow::Context;
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Create a user with a unique, non-empty username
    pub async fn create(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(UserServiceError::ValidationError(format!(
                "Username cannot exceed {} characters",
                MAX_USERNAME_LENGTH
            )));
        }

        let conflict =
            || UserServiceError::Conflict(format!("Username '{}' is already taken", username));

        if self
            .repo
            .get_by_username(username)
            .await
            .context("Failed to check existing username")?
            .is_some()
        {
            return Err(conflict());
        }

        let user = self
            .repo
            .create(&CreateUserInput::new(username, input.is_staff))
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    conflict()
                } else {
                    UserServiceError::InternalError(e.context("Failed to create user"))
                }
            })?;

        tracing::info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<User, UserServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or_else(|| UserServiceError::NotFound(format!("User {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxUserRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        UserService::new(SqlxUserRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_user_trims_name() {
        let service = setup_test_service().await;

        let user = service
            .create(CreateUserInput::new("  carol ", true))
            .await
            .expect("Failed to create user");

        assert_eq!(user.username, "carol");
        assert!(user.is_staff);
        assert_eq!(service.get_by_id(user.id).await.unwrap().username, "carol");
    }

    #[tokio::test]
    async fn test_create_user_rejects_empty_and_long_names() {
        let service = setup_test_service().await;

        let empty = service.create(CreateUserInput::new("   ", false)).await;
        assert!(matches!(empty, Err(UserServiceError::ValidationError(_))));

        let long = "u".repeat(MAX_USERNAME_LENGTH + 1);
        let result = service.create(CreateUserInput::new(&long, false)).await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_user_conflict() {
        let service = setup_test_service().await;
        service.create(CreateUserInput::new("dave", false)).await.unwrap();

        let result = service.create(CreateUserInput::new("dave", true)).await;

        assert!(matches!(result, Err(UserServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_concurrent_creates_of_one_username() {
        let service = setup_test_service().await;

        let (first, second) = tokio::join!(
            service.create(CreateUserInput::new("erin", false)),
            service.create(CreateUserInput::new(" erin", true)),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(UserServiceError::Conflict(_)))));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let service = setup_test_service().await;

        assert!(matches!(
            service.get_by_id(77).await,
            Err(UserServiceError::NotFound(_))
        ));
    }
}
