use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{error, info};

use crate::otp::{OtpCode, OtpPolicy};
use crate::payloads::{MessageBody, ResendOtpRequest};
use crate::routes::errors::RouteError;
use crate::routes::verify::load_pending;
use crate::services::CodeSender;
use crate::store::RegistrationStore;

/// Issues a fresh code on the requested channel, replacing the previous one.
pub async fn resend_otp<S: RegistrationStore, N: CodeSender>(
    req: web::Json<ResendOtpRequest>,
    store: web::Data<S>,
    sender: web::Data<N>,
    policy: web::Data<OtpPolicy>,
) -> Result<HttpResponse, RouteError> {
    let req = req.into_inner();
    let pending = load_pending(store.get_ref(), &req.temp_id, &req.email, &req.phone_number).await?;

    let code = OtpCode::generate();
    let code_hash = code.hash().map_err(|e| {
        error!("{}", e);
        RouteError::Internal
    })?;

    let expires_at = Utc::now() + policy.ttl;
    if !store.set_code(&req.temp_id, req.method, &code_hash, expires_at).await? {
        return Err(RouteError::UnknownSession);
    }

    sender
        .send_code(req.method, pending.destination(req.method), &code)
        .await
        .map_err(RouteError::Delivery)?;

    info!("Resent {} code for {}", req.method, req.temp_id);
    Ok(HttpResponse::Ok().json(MessageBody {
        message: format!("Code sent to your {}", req.method),
    }))
}

pub fn init<S: RegistrationStore, N: CodeSender>(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/resend-otp", web::post().to(resend_otp::<S, N>));
}
