use crate::identity::{
    AuthenticateRequest, ConfirmPasswordResetRequest, ConfirmRegistrationRequest, Error,
    IdentityProvider, PasswordResetRequest, ProviderResponse, RefreshRequest, RegisterRequest,
    Result,
};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};
use std::time::Duration;

/// Content type of the Cognito JSON protocol.
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Prefix of the `X-Amz-Target` header naming the operation.
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// Region a user pool lives in, from its identifier (`us-east-1_AbCdEf` ⇒ `us-east-1`).
fn pool_region(pool_id: &str) -> Result<&str> {
    match pool_id.split_once('_') {
        Some((region, id)) if !region.is_empty() && !id.is_empty() => Ok(region),
        _ => Err(Error::Config(format!(
            "{pool_id:?} is not a user pool identifier"
        ))),
    }
}

fn sign_up_payload(client_id: &str, request: &RegisterRequest) -> Value {
    let mut attributes = Vec::new();
    if let Some(email) = &request.email {
        attributes.push(json!({"Name": "email", "Value": email}));
    }
    if let Some(phone_number) = &request.phone_number {
        attributes.push(json!({"Name": "phone_number", "Value": phone_number}));
    }
    json!({
        "ClientId": client_id,
        "Username": request.username,
        "Password": request.password,
        "UserAttributes": attributes,
    })
}

fn confirm_sign_up_payload(client_id: &str, request: &ConfirmRegistrationRequest) -> Value {
    json!({
        "ClientId": client_id,
        "Username": request.username,
        "ConfirmationCode": request.confirmation_code,
    })
}

fn password_auth_payload(client_id: &str, request: &AuthenticateRequest) -> Value {
    json!({
        "ClientId": client_id,
        "AuthFlow": "USER_PASSWORD_AUTH",
        "AuthParameters": {
            "USERNAME": request.username,
            "PASSWORD": request.password,
        },
    })
}

fn refresh_payload(client_id: &str, request: &RefreshRequest) -> Value {
    json!({
        "ClientId": client_id,
        "AuthFlow": "REFRESH_TOKEN_AUTH",
        "AuthParameters": {
            "REFRESH_TOKEN": request.refresh_token,
        },
    })
}

fn forgot_password_payload(client_id: &str, request: &PasswordResetRequest) -> Value {
    json!({
        "ClientId": client_id,
        "Username": request.username,
    })
}

fn confirm_forgot_password_payload(
    client_id: &str,
    request: &ConfirmPasswordResetRequest,
) -> Value {
    json!({
        "ClientId": client_id,
        "Username": request.username,
        "ConfirmationCode": request.confirmation_code,
        "Password": request.password,
    })
}

/// [IdentityProvider] forwarding to a Cognito user pool app client.
///
/// Only unauthenticated app-client operations are used, so requests are not signed.
#[derive(Clone, Debug)]
pub struct CognitoProvider {
    client_id: String,
    endpoint: String,
    http: reqwest::Client,
}

impl CognitoProvider {
    /// Provider for `client_id` in the user pool `pool_id`.
    ///
    /// Requests taking longer than `timeout` fail with [Error::Transport].
    pub fn new(client_id: impl Into<String>, pool_id: &str, timeout: Duration) -> Result<Self> {
        let endpoint = format!("https://cognito-idp.{}.amazonaws.com/", pool_region(pool_id)?);
        Self::with_endpoint(client_id, endpoint, timeout)
    }

    /// Provider talking to an explicit endpoint, e.g. a local emulator.
    pub fn with_endpoint(
        client_id: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client_id: client_id.into(),
            endpoint: endpoint.into(),
            http,
        })
    }

    async fn call(&self, operation: &str, payload: Value) -> Result<ProviderResponse> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(payload.to_string())
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        // non-JSON payloads are relayed as a string
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        if !status.is_success() {
            tracing::warn!(
                operation,
                status = status.as_u16(),
                "identity provider rejected the request"
            );
        }
        Ok(ProviderResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    async fn register(&self, request: RegisterRequest) -> Result<ProviderResponse> {
        self.call("SignUp", sign_up_payload(&self.client_id, &request))
            .await
    }

    async fn confirm_registration(
        &self,
        request: ConfirmRegistrationRequest,
    ) -> Result<ProviderResponse> {
        self.call(
            "ConfirmSignUp",
            confirm_sign_up_payload(&self.client_id, &request),
        )
        .await
    }

    async fn authenticate(&self, request: AuthenticateRequest) -> Result<ProviderResponse> {
        self.call(
            "InitiateAuth",
            password_auth_payload(&self.client_id, &request),
        )
        .await
    }

    async fn refresh(&self, request: RefreshRequest) -> Result<ProviderResponse> {
        self.call("InitiateAuth", refresh_payload(&self.client_id, &request))
            .await
    }

    async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> Result<ProviderResponse> {
        self.call(
            "ForgotPassword",
            forgot_password_payload(&self.client_id, &request),
        )
        .await
    }

    async fn confirm_password_reset(
        &self,
        request: ConfirmPasswordResetRequest,
    ) -> Result<ProviderResponse> {
        self.call(
            "ConfirmForgotPassword",
            confirm_forgot_password_payload(&self.client_id, &request),
        )
        .await
    }
}
