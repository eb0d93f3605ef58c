use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::routes::errors::error_response;
use crate::store::RegistrationStore;

/// Lists every registered user. There is no authentication, filtering or
/// pagination on this route.
pub async fn list_users<S: RegistrationStore>(store: web::Data<S>) -> impl Responder {
    match store.list_users().await {
        Ok(users) => {
            info!("Fetched {} users", users.len());
            HttpResponse::Ok().json(users)
        }
        Err(e) => {
            error!("Error fetching users: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch users")
        }
    }
}

pub fn init<S: RegistrationStore>(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/admin/users", web::get().to(list_users::<S>));
}
