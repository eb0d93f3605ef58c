use actix_web::error::InternalError;
use actix_web::{web, HttpResponse};

use crate::payloads::ErrorBody;
use crate::services::CodeSender;
use crate::store::RegistrationStore;

pub mod admin;
pub mod errors;
pub mod register;
pub mod resend;
pub mod verify;

/// Malformed JSON bodies get the same `{"error": ...}` shape as handler errors.
pub fn json_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorBody::new(format!("Invalid request body: {}", err)));
        InternalError::from_response(err, response).into()
    }));
}

pub fn init<S: RegistrationStore, N: CodeSender>(cfg: &mut web::ServiceConfig) {
    json_config(cfg);
    admin::users::init::<S>(cfg);
    register::init::<S, N>(cfg);
    verify::init::<S>(cfg);
    resend::init::<S, N>(cfg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::{Channel, OtpPolicy};
    use crate::payloads::RegisterResponse;
    use crate::services::recording::RecordingSender;
    use crate::store::mock::MockRegistrationStore;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn register_resend_to_phone_then_verify() {
        let store = MockRegistrationStore::new();
        let sender = RecordingSender::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .app_data(web::Data::new(sender.clone()))
                .app_data(web::Data::new(OtpPolicy::default()))
                .configure(init::<MockRegistrationStore, RecordingSender>),
        )
        .await;

        let form = json!({
            "name": "Asha",
            "email": "asha@example.com",
            "phoneNumber": "9800000000",
            "vehicleNumber": "BA 2 PA 1234",
        });
        let req = test::TestRequest::post().uri("/api/register").set_json(&form).to_request();
        let registered: RegisterResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/resend-otp")
            .set_json(json!({
                "email": "asha@example.com",
                "phoneNumber": "9800000000",
                "tempId": registered.temp_id,
                "method": "phone",
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let phone_code = sender.last_code(Channel::Phone).unwrap();
        let req = test::TestRequest::post()
            .uri("/api/verify-otp")
            .set_json(json!({
                "email": "asha@example.com",
                "phoneNumber": "9800000000",
                "otp": phone_code,
                "tempId": registered.temp_id,
                "formData": form,
                "method": "phone",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/admin/users").to_request();
        let users: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(users[0]["email"], "asha@example.com");
        assert_eq!(users[0]["paymentDone"], false);
    }
}
