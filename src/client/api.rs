use reqwest::{Client, Response, Url};
use std::future::Future;

use crate::payloads::{ErrorBody, RegisterRequest, RegisterResponse, ResendOtpRequest, VerifyOtpRequest};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{}", .message.as_deref().unwrap_or("request rejected"))]
    Rejected { status: u16, message: Option<String> },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// The server-provided message, if the server gave one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            ApiError::Transport(_) => None,
        }
    }
}

/// The verification endpoints as seen by the page.
pub trait VerifyApi {
    fn verify_otp(&self, request: &VerifyOtpRequest) -> impl Future<Output = Result<(), ApiError>>;

    fn resend_otp(&self, request: &ResendOtpRequest) -> impl Future<Output = Result<(), ApiError>>;
}

#[derive(Debug, Clone)]
pub struct HttpVerifyApi {
    http: Client,
    base: Url,
}

impl HttpVerifyApi {
    pub fn new(base: Url) -> Self {
        Self {
            http: Client::new(),
            base,
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }

    pub async fn register(&self, form: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let response = self.http.post(self.endpoint("/api/register")).json(form).send().await?;
        Ok(check(response).await?.json::<RegisterResponse>().await?)
    }
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .filter(|m| !m.is_empty());
    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

impl VerifyApi for HttpVerifyApi {
    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<(), ApiError> {
        let response = self.http.post(self.endpoint("/api/verify-otp")).json(request).send().await?;
        check(response).await.map(drop)
    }

    async fn resend_otp(&self, request: &ResendOtpRequest) -> Result<(), ApiError> {
        let response = self.http.post(self.endpoint("/api/resend-otp")).json(request).send().await?;
        check(response).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_replace_path_and_query() {
        let api = HttpVerifyApi::new(Url::parse("http://localhost:8080/verify?tempId=x").unwrap());
        assert_eq!(
            api.endpoint("/api/verify-otp").as_str(),
            "http://localhost:8080/api/verify-otp"
        );
    }

    #[test]
    fn rejected_error_displays_server_message_or_fallback() {
        let with = ApiError::Rejected {
            status: 400,
            message: Some("Invalid code".to_string()),
        };
        let without = ApiError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(with.to_string(), "Invalid code");
        assert_eq!(with.server_message(), Some("Invalid code"));
        assert_eq!(without.to_string(), "request rejected");
        assert_eq!(without.server_message(), None);
    }
}
