use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use storage::repository::TokenStore;

use crate::config::ApiConfig;
use crate::error::AuthServiceError;

/// Account role sent at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Registration form data.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub fullname: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Login, registration and logout against the user endpoints.
///
/// A successful login stores the bearer token; logout drops it. The token
/// key is disjoint from the cached result keys, so neither flow disturbs
/// the other.
#[derive(Clone)]
pub struct AuthService {
    client: Client,
    config: ApiConfig,
    token: TokenStore,
}

impl AuthService {
    #[must_use]
    pub fn new(config: ApiConfig, token: TokenStore) -> Self {
        Self {
            client: Client::new(),
            config,
            token,
        }
    }

    /// Exchange credentials for a bearer token and persist it.
    ///
    /// # Errors
    ///
    /// `AuthServiceError::InvalidCredentials` on a 401-class response,
    /// `Server` for other failures, `Storage` if the token cannot be saved.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthServiceError> {
        let response = self
            .client
            .post(self.config.endpoint("/api/user/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let body: TokenResponse = response.json().await?;
        self.token.save(&body.token).await?;
        Ok(())
    }

    /// Create a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// `AuthServiceError::Server` when the backend rejects the registration.
    pub async fn register(&self, registration: &Registration) -> Result<(), AuthServiceError> {
        let response = self
            .client
            .post(self.config.endpoint("/api/user/register"))
            .json(registration)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        Ok(())
    }

    /// Drop the stored token.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::Storage` if the backend cannot be written.
    pub async fn logout(&self) -> Result<(), AuthServiceError> {
        self.token.clear().await?;
        Ok(())
    }

    /// Whether a bearer token is currently stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::Storage` if the backend cannot be read.
    pub async fn is_authenticated(&self) -> Result<bool, AuthServiceError> {
        Ok(self.token.load().await?.is_some())
    }

    async fn error_for(response: Response) -> AuthServiceError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return AuthServiceError::InvalidCredentials;
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        AuthServiceError::Server { status, message }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}
