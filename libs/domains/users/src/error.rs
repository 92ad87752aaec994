use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    /// Message reported by the auth API, shown to the user as-is
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Registration failed. Please try again.")]
    RegistrationFailed,

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Auth API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<reqwest::Error> for UserError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UserError::Decode(err.to_string())
        } else {
            UserError::Transport(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for UserError {
    fn from(err: validator::ValidationErrors) -> Self {
        UserError::Validation(err.to_string())
    }
}
