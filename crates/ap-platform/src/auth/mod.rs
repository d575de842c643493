//! Authentication
//!
//! OTP issuance/validation and JWT token handling. These flows sit next
//! to the RBAC engine but share none of its invariants: an OTP row is a
//! single mutable record per channel and user type, and tokens are
//! stateless signed claims.

pub mod otp;
pub mod otp_repository;
pub mod otp_service;
pub mod token;
pub mod notification;
pub mod api;

pub use otp::{Otp, OtpUserType};
pub use otp_repository::OtpRepository;
pub use otp_service::OtpService;
pub use token::{TokenService, TokenClaims};
pub use notification::NotificationClient;
pub use api::{AuthState, auth_router};

/// Configuration for the auth services.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT secret key for HS256 signing
    pub jwt_secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry_secs: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry_secs: i64,

    /// OTP time-to-live in seconds, measured from the last (re)issue
    pub otp_ttl_secs: i64,

    /// Base URL of the external OTP/SMS service; when unset, codes are
    /// generated locally (development mode)
    pub sms_base_url: Option<String>,

    /// Development mode: issued OTP codes are echoed back in responses
    pub dev_mode: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_expiry_secs: 3600,        // 1 hour
            refresh_token_expiry_secs: 86400 * 30, // 30 days
            otp_ttl_secs: 300,                     // 5 minutes
            sms_base_url: None,
            dev_mode: false,
        }
    }
}
