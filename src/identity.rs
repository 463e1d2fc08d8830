//! Identity provider pass-through.
//!
//! Registration, confirmation, login, token refresh and password reset are forwarded to an
//! external provider. Credentials are only marshaled into the provider's request shape; the
//! provider's status code and payload are relayed to the caller unchanged.

/// Amazon Cognito user pool provider.
pub mod cognito;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity provider errors. Provider-side rejections are not errors: they come back as a
/// [ProviderResponse] carrying the provider's status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The provider configuration is unusable.
    #[error("invalid identity provider configuration: {0}")]
    Config(String),
    /// The provider could not be reached, or its response could not be read.
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result alias for identity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The provider's answer, relayed as-is.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProviderResponse {
    /// HTTP status returned by the provider.
    pub status: u16,
    /// Payload returned by the provider.
    pub body: Value,
}

/// Sign-up request.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// The user name to register.
    pub username: String,
    /// The initial password.
    pub password: String,
    /// Optional e-mail attribute.
    #[serde(default)]
    pub email: Option<String>,
    /// Optional phone number attribute.
    #[serde(default, alias = "phone_number")]
    pub phone_number: Option<String>,
}

/// Sign-up confirmation request.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRegistrationRequest {
    /// The registered user name.
    pub username: String,
    /// The code delivered to the user.
    pub confirmation_code: String,
}

/// Password authentication request.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    /// The user name.
    pub username: String,
    /// The password.
    pub password: String,
}

/// Token refresh request.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token issued at authentication.
    pub refresh_token: String,
}

/// Forgotten password request.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    /// The user name.
    pub username: String,
}

/// Forgotten password confirmation request.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPasswordResetRequest {
    /// The user name.
    pub username: String,
    /// The code delivered to the user.
    pub confirmation_code: String,
    /// The new password.
    pub password: String,
}

/// Identity operations delegated to an external provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new user.
    async fn register(&self, request: RegisterRequest) -> Result<ProviderResponse>;
    /// Confirm a registration with the delivered code.
    async fn confirm_registration(
        &self,
        request: ConfirmRegistrationRequest,
    ) -> Result<ProviderResponse>;
    /// Authenticate with user name and password.
    async fn authenticate(&self, request: AuthenticateRequest) -> Result<ProviderResponse>;
    /// Exchange a refresh token for new tokens.
    async fn refresh(&self, request: RefreshRequest) -> Result<ProviderResponse>;
    /// Start the forgotten password flow.
    async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> Result<ProviderResponse>;
    /// Finish the forgotten password flow.
    async fn confirm_password_reset(
        &self,
        request: ConfirmPasswordResetRequest,
    ) -> Result<ProviderResponse>;
}
