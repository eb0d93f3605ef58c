use reqwest::Client;
use serde::Serialize;

use super::SendError;
use crate::config::SmsSettings;
use crate::otp::OtpCode;

#[derive(Debug, Serialize)]
struct SmsPayload<'a> {
    to: &'a str,
    message: String,
}

pub fn code_message(code: &OtpCode) -> String {
    format!("Your verification code is {}. It expires shortly, do not share it.", code)
}

pub async fn send_code_sms(
    client: &Client,
    settings: &SmsSettings,
    phone_number: &str,
    code: &OtpCode,
) -> Result<(), SendError> {
    let payload = SmsPayload {
        to: phone_number,
        message: code_message(code),
    };

    let mut request = client.post(&settings.gateway_url).json(&payload);
    if let Some(token) = &settings.token {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| SendError::Sms(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(SendError::Sms(format!("gateway returned {}: {}", status, text)));
    }

    Ok(())
}
