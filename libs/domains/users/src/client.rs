//! HTTP client for the auth API (`/register`, `/login`, `/me`).

use core_config::ApiConfig;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{AuthPayload, AuthUser, LoginUser, RegisterUser};
use crate::session::SessionHandle;

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ApiFailure {
    message: Option<String>,
}

/// Which auth call failed; decides the fallback message
#[derive(Debug, Clone, Copy)]
enum AuthCall {
    Register,
    Login,
    Me,
}

/// Auth API client bound to a session handle.
///
/// Successful `register`, `login` and `resume` calls start the session; `logout`
/// ends it. Credentials are never persisted by the client.
pub struct AuthClient {
    client: Client,
    config: ApiConfig,
    session: SessionHandle,
}

impl AuthClient {
    pub fn new(config: ApiConfig, session: SessionHandle) -> UserResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            session,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Create an account and sign in as it
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterUser) -> UserResult<AuthUser> {
        input.validate()?;

        let response = self
            .client
            .post(self.config.auth_route("register"))
            .json(&input)
            .send()
            .await?;

        let payload: AuthPayload = decode(response, AuthCall::Register).await?;
        self.session.start(payload.user.clone(), payload.token);
        Ok(payload.user)
    }

    /// Sign in with email and password
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginUser) -> UserResult<AuthUser> {
        input.validate()?;

        let response = self
            .client
            .post(self.config.auth_route("login"))
            .json(&input)
            .send()
            .await?;

        let payload: AuthPayload = decode(response, AuthCall::Login).await?;
        self.session.start(payload.user.clone(), payload.token);
        Ok(payload.user)
    }

    /// Fetch the user behind the active session
    #[instrument(skip(self))]
    pub async fn me(&self) -> UserResult<AuthUser> {
        let bearer = self.session.bearer().ok_or(UserError::Unauthorized)?;
        self.fetch_me(bearer).await
    }

    /// Rehydrate a session from a previously issued token.
    ///
    /// The token is only kept when the API accepts it; otherwise any current
    /// session is ended.
    #[instrument(skip(self, token))]
    pub async fn resume(&self, token: impl Into<String>) -> UserResult<AuthUser> {
        let token = token.into();

        match self.fetch_me(format!("Bearer {}", token)).await {
            Ok(user) => {
                self.session.start(user.clone(), token);
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "Stored token rejected, clearing session");
                self.session.end();
                Err(err)
            }
        }
    }

    /// End the session; returns the user that was signed in
    pub fn logout(&self) -> Option<AuthUser> {
        self.session.end()
    }

    async fn fetch_me(&self, bearer: String) -> UserResult<AuthUser> {
        let response = self
            .client
            .get(self.config.auth_route("me"))
            .header(AUTHORIZATION, bearer)
            .send()
            .await?;

        decode(response, AuthCall::Me).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, call: AuthCall) -> UserResult<T> {
    let status = response.status();
    if status.is_success() {
        let envelope: ApiEnvelope<T> = response.json().await?;
        return Ok(envelope.data);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiFailure>(&body)
        .ok()
        .and_then(|failure| failure.message)
        .filter(|message| !message.trim().is_empty());
    debug!(status = %status, ?call, "Auth API rejected request");

    Err(match (call, message) {
        (AuthCall::Me, _) if status == StatusCode::UNAUTHORIZED => UserError::Unauthorized,
        (AuthCall::Me, message) => UserError::Api {
            status: status.as_u16(),
            message: message.unwrap_or(body),
        },
        (_, Some(message)) => UserError::Rejected(message),
        (AuthCall::Login, None) => UserError::InvalidCredentials,
        (AuthCall::Register, None) => UserError::RegistrationFailed,
    })
}
