//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use boutique_core::validation::ShippingAddress;
use boutique_core::{PaymentMethod, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::user::{Role, User};

const EMAIL_TAKEN: &str = "email already exists";

#[derive(FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    role: String,
    address: Option<Json<ShippingAddress>>,
    payment_method: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;
        let payment_method = row
            .payment_method
            .map(|m| m.parse::<PaymentMethod>())
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid payment method in database: {e}"))
            })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            address: row.address.map(|Json(address)| address),
            payment_method,
            created_at: row.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, role, address, payment_method, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    /// Get a user by email address (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, role, address, payment_method, created_at
            FROM users
            WHERE lower(email) = lower($1)
            ",
        )
        .bind(email.trim())
        .fetch_optional(self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    /// Create a user with the default role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role, address, payment_method, created_at
            ",
        )
        .bind(name.trim())
        .bind(email.trim())
        .bind(password_hash)
        .bind(Role::User.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique(EMAIL_TAKEN))?;

        User::try_from(row)
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(
            r"
            SELECT id, name, email, role, address, payment_method, created_at, password_hash
            FROM users
            WHERE lower(email) = lower($1)
            ",
        )
        .bind(email.trim())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let Some(password_hash) = row.password_hash else {
            return Ok(None);
        };

        Ok(Some((User::try_from(row.user)?, password_hash)))
    }

    /// Update a user's name and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the email belongs to another user.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: &str,
        email: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users SET name = $2, email = $3
            WHERE id = $1
            RETURNING id, name, email, role, address, payment_method, created_at
            ",
        )
        .bind(id)
        .bind(name.trim())
        .bind(email.trim())
        .fetch_optional(self.pool)
        .await
        .map_err(conflict_on_unique(EMAIL_TAKEN))?
        .ok_or(RepositoryError::NotFound)?;

        User::try_from(row)
    }

    /// Update a user's profile and role (admin edit).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the email belongs to another user.
    pub async fn update(
        &self,
        id: UserId,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users SET name = $2, email = $3, role = $4
            WHERE id = $1
            RETURNING id, name, email, role, address, payment_method, created_at
            ",
        )
        .bind(id)
        .bind(name.trim())
        .bind(email.trim())
        .bind(role.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(conflict_on_unique(EMAIL_TAKEN))?
        .ok_or(RepositoryError::NotFound)?;

        User::try_from(row)
    }

    /// Save the shipping address used at checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_address(
        &self,
        id: UserId,
        address: &ShippingAddress,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET address = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(address))
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Save the payment method chosen at checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_payment_method(
        &self,
        id: UserId,
        method: PaymentMethod,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET payment_method = $2 WHERE id = $1")
            .bind(id)
            .bind(method.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
