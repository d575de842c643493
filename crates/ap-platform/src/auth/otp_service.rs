//! OTP Service
//!
//! Issuance and validation of one-time passcodes. One row exists per
//! channel and user type: re-requesting a code overwrites the row and
//! restarts the expiry window.

use std::sync::Arc;
use chrono::Utc;
use tracing::info;

use crate::auth::notification::{NotificationClient, OtpDeliveryRequest};
use crate::auth::otp::{Otp, OtpUserType};
use crate::auth::otp_repository::OtpRepository;
use crate::details;
use crate::shared::error::{AuthError, Result};
use crate::usecase::UseCaseError;

/// A phone or email delivery channel.
#[derive(Debug, Clone)]
pub struct OtpChannel {
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl OtpChannel {
    fn validate(&self) -> Result<()> {
        if self.phone.is_none() && self.email.is_none() {
            return Err(AuthError::from(UseCaseError::validation(
                "CHANNEL_REQUIRED",
                "Either phone or email is required",
            )));
        }
        Ok(())
    }
}

pub struct OtpService {
    otps: Arc<OtpRepository>,
    notifier: Arc<NotificationClient>,
    ttl_secs: i64,
}

impl OtpService {
    pub fn new(otps: Arc<OtpRepository>, notifier: Arc<NotificationClient>, ttl_secs: i64) -> Self {
        Self {
            otps,
            notifier,
            ttl_secs,
        }
    }

    async fn find_existing(
        &self,
        channel: &OtpChannel,
        user_type: OtpUserType,
    ) -> Result<Option<Otp>> {
        if let Some(phone) = &channel.phone {
            return self.otps.find_by_phone(phone, user_type).await;
        }
        if let Some(email) = &channel.email {
            return self.otps.find_by_email(email, user_type).await;
        }
        Ok(None)
    }

    /// Issue (or re-issue) a code for the channel. The previous code for
    /// the same channel and user type, if any, is overwritten.
    pub async fn request(
        &self,
        channel: OtpChannel,
        name: Option<String>,
        user_type: OtpUserType,
    ) -> Result<Otp> {
        channel.validate()?;

        let code = self
            .notifier
            .request_otp(&OtpDeliveryRequest {
                phone: channel.phone.clone(),
                email: channel.email.clone(),
                name,
            })
            .await?;

        let otp = match self.find_existing(&channel, user_type).await? {
            Some(mut existing) => {
                existing.reissue(&code);
                self.otps.update(&existing).await?;
                existing
            }
            None => {
                let otp = Otp::new(channel.phone.clone(), channel.email.clone(), &code, user_type);
                self.otps.insert(&otp).await?;
                otp
            }
        };

        info!(
            channel = channel.phone.as_deref().or(channel.email.as_deref()).unwrap_or("-"),
            user_type = user_type.as_str(),
            "Issued OTP"
        );
        Ok(otp)
    }

    /// Validate a submitted code: the row must exist, the code must
    /// match, and the row must not have outlived its TTL. On success the
    /// row is marked validated.
    pub async fn validate(
        &self,
        channel: OtpChannel,
        otp_code: &str,
        user_type: OtpUserType,
    ) -> Result<Otp> {
        channel.validate()?;

        let mut otp = self
            .find_existing(&channel, user_type)
            .await?
            .ok_or_else(|| {
                let channel_value = channel
                    .phone
                    .as_deref()
                    .or(channel.email.as_deref())
                    .unwrap_or_default()
                    .to_string();
                AuthError::from(UseCaseError::not_found_with_details(
                    "OTP_NOT_FOUND",
                    "No OTP has been requested for this channel",
                    details! { "property" => "phone", "value" => channel_value },
                ))
            })?;

        if otp.otp_code != otp_code {
            return Err(AuthError::from(UseCaseError::validation_with_details(
                "OTP_MISMATCH",
                "The submitted OTP code does not match",
                details! { "property" => "otp_code", "value" => otp_code },
            )));
        }

        if otp.is_expired(Utc::now(), self.ttl_secs) {
            return Err(AuthError::from(UseCaseError::validation(
                "OTP_EXPIRED",
                "The OTP code has expired, request a new one",
            )));
        }

        otp.validated = true;
        otp.updated_at = Utc::now();
        self.otps.update(&otp).await?;

        Ok(otp)
    }
}
