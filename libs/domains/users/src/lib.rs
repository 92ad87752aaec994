//! Users Domain
//!
//! Client side of authentication for the task app: who is signed in, and the bearer
//! token every task request carries.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  AuthClient  │  ← register / login / me / resume over HTTP
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │SessionHandle │  ← explicit, shared session context
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │    Models    │  ← AuthUser, form DTOs
//! └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::ApiConfig;
//! use domain_users::{AuthClient, LoginUser, SessionHandle};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = SessionHandle::new();
//! let auth = AuthClient::new(ApiConfig::default(), session.clone())?;
//!
//! auth.login(LoginUser {
//!     email: "ada@example.com".to_string(),
//!     password: "secret1".to_string(),
//! })
//! .await?;
//! assert!(session.is_active());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use client::AuthClient;
pub use error::{UserError, UserResult};
pub use models::{AuthUser, LoginUser, RegisterUser};
pub use session::{Session, SessionHandle};
