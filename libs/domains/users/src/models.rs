use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signed-in user as reported by the auth API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Server-assigned identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

impl AuthUser {
    /// Uppercased first letter of the name, used as an avatar placeholder
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_ascii_uppercase())
    }
}

/// Register/login response payload: the user plus a bearer token
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthPayload {
    #[serde(flatten)]
    pub user: AuthUser,
    pub token: String,
}

/// Registration form data
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 100, message = "Please enter your name"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Repeated password; checked locally and never sent
    #[serde(skip_serializing)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Login form data
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginUser {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter your password"))]
    pub password: String,
}
