//! Account schemas: sign-in, sign-up, profile and admin user edits.

use core::fmt;

use serde::Deserialize;
use validator::Validate;

/// Credentials submitted on the sign-in form.
#[derive(Clone, Deserialize, Validate)]
pub struct SignInForm {
    #[validate(email(message = "Invalid email address"))]
    #[validate(length(min = 3, message = "Email must be at least 3 characters"))]
    pub email: String,
    #[validate(length(min = 3, message = "Password must be at least 3 characters"))]
    pub password: String,
}

/// Registration form. `confirm_password` must equal `password`.
#[derive(Clone, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    #[validate(length(min = 3, message = "Email must be at least 3 characters"))]
    pub email: String,
    #[validate(length(min = 3, message = "Password must be at least 3 characters"))]
    pub password: String,
    #[validate(length(min = 3, message = "Confirm password must be at least 3 characters"))]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

// Passwords stay out of logs.
impl fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

/// Profile edit by the signed-in user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileForm {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    #[validate(length(min = 3, message = "Email must be at least 3 characters"))]
    pub email: String,
}

/// Admin edit of any user, including their role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserForm {
    #[validate(length(min = 1, message = "Id is required"))]
    pub id: String,
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    #[validate(length(min = 3, message = "Email must be at least 3 characters"))]
    pub email: String,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}
