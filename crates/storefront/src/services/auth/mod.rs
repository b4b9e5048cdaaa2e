//! Authentication service.
//!
//! Password sign-up and sign-in. Input is validated by the caller with
//! [`SignUpForm`] / [`SignInForm`]; this service only hashes, stores and
//! verifies.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use boutique_core::validation::{SignInForm, SignUpForm};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user from a validated sign-up form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<User, AuthError> {
        let password_hash = hash_password(&form.password)?;

        let user = self
            .users
            .create_with_password(&form.name, &form.email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Sign in with a validated sign-in form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn sign_in(&self, form: &SignInForm) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_password_hash(&form.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&form.password, &password_hash)?;

        Ok(user)
    }
}

/// Hash a password with argon2 and a random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("abc123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("abc123", &hash).is_ok());
        assert!(matches!(
            verify_password("abc124", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("abc123").unwrap(), hash_password("abc123").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("abc123", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
