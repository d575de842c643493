//! Auth API
//!
//! OTP request/validation endpoints. A successful validation issues the
//! access and refresh token pair.

use axum::{extract::State, Json};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::otp::OtpUserType;
use crate::auth::otp_service::{OtpChannel, OtpService};
use crate::auth::token::TokenService;
use crate::shared::error::AuthError;

/// Request an OTP for a phone or email channel
#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestOtpRequest {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub user_type: OtpUserType,
}

/// OTP issue acknowledgement. The code itself is only echoed in
/// development mode.
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestOtpResponse {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

/// Validate a previously requested OTP
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateOtpRequest {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub otp_code: String,
    #[serde(default)]
    pub user_type: OtpUserType,
}

/// Token pair issued after a successful validation
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
}

/// Auth service state
#[derive(Clone)]
pub struct AuthState {
    pub otp_service: Arc<OtpService>,
    pub token_service: Arc<TokenService>,
    /// Echo issued codes back in responses (development mode)
    pub expose_otp_codes: bool,
}

/// Request an OTP
#[utoipa::path(
    post,
    path = "/otp",
    tag = "auth",
    operation_id = "postAuthOtp",
    request_body = RequestOtpRequest,
    responses(
        (status = 200, description = "OTP issued", body = RequestOtpResponse),
        (status = 400, description = "Missing channel")
    )
)]
pub async fn request_otp(
    State(state): State<AuthState>,
    Json(req): Json<RequestOtpRequest>,
) -> Result<Json<RequestOtpResponse>, AuthError> {
    let otp = state
        .otp_service
        .request(
            OtpChannel {
                phone: req.phone,
                email: req.email,
            },
            req.name,
            req.user_type,
        )
        .await?;

    let otp_code = state.expose_otp_codes.then_some(otp.otp_code);
    Ok(Json(RequestOtpResponse {
        status: true,
        otp: otp_code,
    }))
}

/// Validate an OTP and issue a token pair
#[utoipa::path(
    post,
    path = "/otp-validation",
    tag = "auth",
    operation_id = "postAuthOtpValidation",
    request_body = ValidateOtpRequest,
    responses(
        (status = 200, description = "OTP valid, tokens issued", body = LoginResponse),
        (status = 400, description = "Code mismatch or expired"),
        (status = 404, description = "No OTP requested for this channel")
    )
)]
pub async fn validate_otp(
    State(state): State<AuthState>,
    Json(req): Json<ValidateOtpRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let otp = state
        .otp_service
        .validate(
            OtpChannel {
                phone: req.phone,
                email: req.email,
            },
            &req.otp_code,
            req.user_type,
        )
        .await?;

    let mut payload = serde_json::Map::new();
    if let Some(phone) = &otp.phone {
        payload.insert("phone".to_string(), serde_json::json!(phone));
    }
    if let Some(email) = &otp.email {
        payload.insert("email".to_string(), serde_json::json!(email));
    }
    payload.insert("user_type".to_string(), serde_json::json!(otp.user_type));

    let token = state.token_service.create_access_token(payload.clone())?;
    let refresh_token = state.token_service.create_refresh_token(payload)?;

    Ok(Json(LoginResponse {
        token,
        refresh_token,
    }))
}

/// Create auth router
pub fn auth_router(state: AuthState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(request_otp))
        .routes(routes!(validate_otp))
        .with_state(state)
}
