use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};

use regverify::config::Config;
use regverify::databases::setup_backend;
use regverify::otp::OtpPolicy;
use regverify::routes;
use regverify::services::Messenger;
use regverify::store::PgRegistrationStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let pool = setup_backend(&config).await?;

    let store = PgRegistrationStore::new(pool);
    let messenger = Messenger::new(&config);
    let policy = OtpPolicy::from_config(&config);

    if config.smtp.is_none() {
        warn!("SMTP not configured, email codes will only be logged");
    }
    if config.sms.is_none() {
        warn!("SMS gateway not configured, phone codes will only be logged");
    }

    info!("Listening on http://{}:{}", config.bind_addr, config.port);
    match local_ip_address::local_ip() {
        Ok(ip) => info!("LAN address: http://{}:{}", ip, config.port),
        Err(e) => warn!("Could not determine LAN address: {}", e),
    }

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(messenger.clone()))
            .app_data(web::Data::new(policy))
            .configure(routes::init::<PgRegistrationStore, Messenger>)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
    .context("HTTP server stopped with an error")
}
