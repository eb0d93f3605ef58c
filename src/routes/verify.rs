use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{info, warn};

use crate::databases::auth::pending::PendingRegistration;
use crate::databases::users::user::NewUser;
use crate::otp::{OtpCode, OtpPolicy};
use crate::payloads::{SubmittedForm, VerifiedResponse, VerifyOtpRequest};
use crate::routes::errors::RouteError;
use crate::store::RegistrationStore;

/// Looks up a pending registration and checks that the caller knows both its
/// email and phone number.
pub(crate) async fn load_pending<S: RegistrationStore>(
    store: &S,
    temp_id: &str,
    email: &str,
    phone_number: &str,
) -> Result<PendingRegistration, RouteError> {
    let pending = store
        .find_pending(temp_id)
        .await?
        .ok_or(RouteError::UnknownSession)?;

    if !pending.matches_identity(email, phone_number) {
        warn!("Identity mismatch for pending registration {}", temp_id);
        return Err(RouteError::IdentityMismatch);
    }
    Ok(pending)
}

/// Confirms the code for the chosen channel and turns the pending
/// registration into a user.
pub async fn verify_otp<S: RegistrationStore>(
    req: web::Json<VerifyOtpRequest>,
    store: web::Data<S>,
    policy: web::Data<OtpPolicy>,
) -> Result<HttpResponse, RouteError> {
    let req = req.into_inner();
    let code = OtpCode::parse(&req.otp).map_err(|_| RouteError::MalformedCode)?;

    let pending = load_pending(store.get_ref(), &req.temp_id, &req.email, &req.phone_number).await?;

    let issued = pending
        .issued_code(req.method)
        .ok_or(RouteError::NoCodeIssued(req.method))?;
    if issued.expires_at <= Utc::now() {
        return Err(RouteError::Expired);
    }

    let form: SubmittedForm = serde_json::from_value(req.form_data).map_err(|_| RouteError::InvalidForm)?;
    if form.name.trim().is_empty() || form.vehicle_number.trim().is_empty() {
        return Err(RouteError::InvalidForm);
    }

    // The attempt is counted before the hash is compared.
    let attempts = store
        .reserve_attempt(&req.temp_id, policy.max_attempts)
        .await?
        .ok_or(RouteError::TooManyAttempts)?;

    if !code.matches(issued.hash) {
        warn!("Wrong {} code for {} (attempt {})", req.method, req.temp_id, attempts);
        return Err(RouteError::InvalidCode);
    }

    let new_user = NewUser {
        name: form.name.trim().to_string(),
        email: pending.email,
        phone_number: pending.phone_number,
        vehicle_number: form.vehicle_number.trim().to_string(),
    };

    // A concurrent submission may have consumed the registration first.
    let user = store
        .complete_registration(&req.temp_id, new_user)
        .await?
        .ok_or(RouteError::UnknownSession)?;

    info!("Registration {} verified via {} as user {}", req.temp_id, req.method, user.id);
    Ok(HttpResponse::Ok().json(VerifiedResponse {
        message: "User verified and registered successfully".to_string(),
        user_id: user.id,
    }))
}

pub fn init<S: RegistrationStore>(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/verify-otp", web::post().to(verify_otp::<S>));
}
