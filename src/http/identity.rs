use crate::{
    Result,
    http::AppState,
    identity::{
        AuthenticateRequest, ConfirmPasswordResetRequest, ConfirmRegistrationRequest,
        PasswordResetRequest, ProviderResponse, RefreshRequest, RegisterRequest,
    },
};

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};

/// Identity routes, nested under `/identity`.
pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/confirm", post(confirm_registration))
        .route("/login", post(authenticate))
        .route("/refresh", post(refresh))
        .route("/forgot-password", post(request_password_reset))
        .route("/confirm-forgot-password", post(confirm_password_reset))
}

/// Relay the provider's status and payload.
fn relay(response: ProviderResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(response.body)).into_response()
}

/// Define a handler forwarding a typed request body to one provider operation.
macro_rules! pass_through {
    ($handler:ident, $request:ty, $operation:ident) => {
        async fn $handler(
            State(state): State<AppState>,
            payload: std::result::Result<Json<$request>, JsonRejection>,
        ) -> Result<Response> {
            let Json(request) = payload?;
            let response = state.identity.$operation(request).await?;
            Ok(relay(response))
        }
    };
}

pass_through!(register, RegisterRequest, register);
pass_through!(confirm_registration, ConfirmRegistrationRequest, confirm_registration);
pass_through!(authenticate, AuthenticateRequest, authenticate);
pass_through!(refresh, RefreshRequest, refresh);
pass_through!(request_password_reset, PasswordResetRequest, request_password_reset);
pass_through!(confirm_password_reset, ConfirmPasswordResetRequest, confirm_password_reset);
