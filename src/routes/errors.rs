use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;

use crate::otp::Channel;
use crate::payloads::ErrorBody;
use crate::services::SendError;
use crate::store::StoreError;

/// Failures of the registration endpoints, rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("All fields are required")]
    MissingFields,

    #[error("User already exists")]
    UserExists,

    #[error("Code must be exactly 6 digits")]
    MalformedCode,

    #[error("Verification session not found")]
    UnknownSession,

    #[error("Verification details do not match")]
    IdentityMismatch,

    #[error("No code has been sent to your {0}")]
    NoCodeIssued(Channel),

    #[error("Code expired, request a new one")]
    Expired,

    #[error("Too many attempts, request a new code")]
    TooManyAttempts,

    #[error("Invalid code")]
    InvalidCode,

    #[error("Invalid form data")]
    InvalidForm,

    #[error("Failed to send verification code")]
    Delivery(#[source] SendError),

    #[error("Internal server error")]
    Internal,
}

impl From<StoreError> for RouteError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => RouteError::UserExists,
            e => {
                error!("Store error: {:?}", e);
                RouteError::Internal
            }
        }
    }
}

impl ResponseError for RouteError {
    fn status_code(&self) -> StatusCode {
        match self {
            RouteError::MissingFields
            | RouteError::MalformedCode
            | RouteError::IdentityMismatch
            | RouteError::NoCodeIssued(_)
            | RouteError::InvalidCode
            | RouteError::InvalidForm => StatusCode::BAD_REQUEST,
            RouteError::UserExists => StatusCode::CONFLICT,
            RouteError::UnknownSession => StatusCode::NOT_FOUND,
            RouteError::Expired => StatusCode::GONE,
            RouteError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            RouteError::Delivery(_) => StatusCode::BAD_GATEWAY,
            RouteError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), self.to_string())
    }
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody::new(message))
}
