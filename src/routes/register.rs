use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{error, info};

use crate::databases::auth::pending::PendingRegistration;
use crate::otp::{Channel, OtpCode, OtpPolicy};
use crate::payloads::{RegisterRequest, RegisterResponse};
use crate::routes::errors::RouteError;
use crate::services::CodeSender;
use crate::store::RegistrationStore;

/// Starts a registration: stores it as pending and emails the first code.
pub async fn register<S: RegistrationStore, N: CodeSender>(
    data: web::Json<RegisterRequest>,
    store: web::Data<S>,
    sender: web::Data<N>,
    policy: web::Data<OtpPolicy>,
) -> Result<HttpResponse, RouteError> {
    let form = data.into_inner();

    let fields = [&form.name, &form.email, &form.phone_number, &form.vehicle_number];
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(RouteError::MissingFields);
    }
    let email = form.email.trim().to_lowercase();
    let phone_number = form.phone_number.trim();

    if store.user_exists(&email, phone_number).await? {
        return Err(RouteError::UserExists);
    }

    let code = OtpCode::generate();
    let code_hash = code.hash().map_err(|e| {
        error!("{}", e);
        RouteError::Internal
    })?;

    let pending = PendingRegistration::new(email.as_str(), phone_number)
        .with_code(Channel::Email, code_hash, Utc::now() + policy.ttl);
    let temp_id = pending.temp_id.clone();
    store.create_pending(pending).await?;

    if let Err(e) = sender.send_code(Channel::Email, &email, &code).await {
        store.discard_pending(&temp_id).await?;
        return Err(RouteError::Delivery(e));
    }

    info!("Started registration {}", temp_id);
    Ok(HttpResponse::Ok().json(RegisterResponse { temp_id }))
}

pub fn init<S: RegistrationStore, N: CodeSender>(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/register", web::post().to(register::<S, N>));
}
