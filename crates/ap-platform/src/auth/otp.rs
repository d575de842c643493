//! OTP Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Which flow an OTP row belongs to. One row exists per channel and
/// user type; re-requesting a code overwrites it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OtpUserType {
    #[serde(rename = "login")]
    Login,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "customer")]
    Customer,
    #[serde(rename = "registration")]
    Registration,
    #[serde(rename = "forgot-password")]
    ForgotPassword,
    #[serde(rename = "phone-change")]
    PhoneChange,
}

impl Default for OtpUserType {
    fn default() -> Self {
        Self::Login
    }
}

impl OtpUserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Admin => "admin",
            Self::Customer => "customer",
            Self::Registration => "registration",
            Self::ForgotPassword => "forgot-password",
            Self::PhoneChange => "phone-change",
        }
    }
}

/// One-time passcode issued to a phone or email channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Otp {
    /// UUID as string
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub referral_code: Option<String>,

    pub otp_code: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub apps_id: Option<String>,

    pub user_type: OtpUserType,

    /// Set once the code has been successfully validated
    #[serde(default)]
    pub validated: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional"
    )]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Otp {
    pub fn new(
        phone: Option<String>,
        email: Option<String>,
        otp_code: impl Into<String>,
        user_type: OtpUserType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            phone,
            email,
            referral_code: None,
            otp_code: otp_code.into(),
            apps_id: None,
            user_type,
            validated: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Overwrite the code for a re-request; the expiry window restarts.
    pub fn reissue(&mut self, otp_code: impl Into<String>) {
        self.otp_code = otp_code.into();
        self.validated = false;
        self.updated_at = Utc::now();
    }

    /// Whether this code has outlived its TTL, measured from the last
    /// (re)issue.
    pub fn is_expired(&self, at: DateTime<Utc>, ttl_secs: i64) -> bool {
        at - self.updated_at > Duration::seconds(ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_code_is_not_expired() {
        let otp = Otp::new(Some("08123".into()), None, "123456", OtpUserType::Login);
        assert!(!otp.is_expired(Utc::now(), 300));
    }

    #[test]
    fn test_old_code_is_expired() {
        let otp = Otp::new(Some("08123".into()), None, "123456", OtpUserType::Login);
        let later = otp.updated_at + Duration::seconds(301);
        assert!(otp.is_expired(later, 300));
    }

    #[test]
    fn test_reissue_restarts_the_window_and_clears_validation() {
        let mut otp = Otp::new(Some("08123".into()), None, "123456", OtpUserType::Login);
        otp.validated = true;

        otp.reissue("654321");

        assert_eq!(otp.otp_code, "654321");
        assert!(!otp.validated);
        assert!(!otp.is_expired(Utc::now(), 300));
    }

    #[test]
    fn test_user_type_wire_format() {
        let json = serde_json::to_string(&OtpUserType::ForgotPassword).unwrap();
        assert_eq!(json, "\"forgot-password\"");
    }
}
