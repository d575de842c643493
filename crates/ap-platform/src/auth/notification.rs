//! OTP Notification Collaborator
//!
//! HTTP client for the external OTP/SMS service. The service generates
//! the code and delivers it over SMS or email; we keep the returned code
//! to validate against later. Without a configured base URL the code is
//! generated locally instead (development mode, nothing is sent).

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::shared::error::{AuthError, Result};

/// Request forwarded to the OTP/SMS service.
#[derive(Debug, Clone, Serialize)]
pub struct OtpDeliveryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OtpDeliveryBody {
    data: OtpDeliveryData,
}

#[derive(Debug, Deserialize)]
struct OtpDeliveryData {
    otp_code: String,
}

/// Client for the external OTP/SMS collaborator.
pub struct NotificationClient {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl NotificationClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Ask the collaborator to deliver a fresh OTP and return its code.
    pub async fn request_otp(&self, request: &OtpDeliveryRequest) -> Result<String> {
        let Some(base_url) = &self.base_url else {
            let code = generate_local_code();
            info!(
                channel = request.phone.as_deref().or(request.email.as_deref()).unwrap_or("-"),
                "No OTP service configured, generated code locally"
            );
            return Ok(code);
        };

        let url = format!("{}/api/v1/otp/otp", base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AuthError::notification(format!("OTP service unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::notification(format!(
                "OTP service returned status {}",
                response.status()
            )));
        }

        let body: OtpDeliveryBody = response
            .json()
            .await
            .map_err(|e| AuthError::notification(format!("Invalid OTP service response: {}", e)))?;

        Ok(body.data.otp_code)
    }
}

/// Six-digit numeric code for development mode.
fn generate_local_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_local_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_without_base_url_codes_are_local() {
        let client = NotificationClient::new(None);
        let code = client
            .request_otp(&OtpDeliveryRequest {
                phone: Some("08123456789".to_string()),
                email: None,
                name: None,
            })
            .await
            .unwrap();
        assert_eq!(code.len(), 6);
    }
}
